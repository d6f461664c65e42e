// Prompt templates for resume analysis.
// Placeholders are replaced with `str::replace` before sending.

/// System prompt for the ATS review.
pub const ATS_SYSTEM: &str = "You are an expert recruiter emulating an Applicant Tracking System. \
    Score resumes for ATS compatibility and extract candidate details. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// ATS review prompt. Replace `{resume_text}`.
pub const ATS_PROMPT_TEMPLATE: &str = r#"Analyze this resume for ATS compatibility and extract the candidate's details. Return a JSON object with this structure:
{
  "overallScore": number (0-100),
  "sections": {
    "formatting": {"score": number, "feedback": string},
    "keywords": {"score": number, "feedback": string, "foundKeywords": string[]},
    "experience": {"score": number, "feedback": string},
    "education": {"score": number, "feedback": string},
    "skills": {"score": number, "feedback": string, "identifiedSkills": string[]}
  },
  "strengths": string[],
  "improvements": string[],
  "atsCompatibility": string,
  "candidateDetails": {
    "name": string,
    "email": string,
    "contactLinks": string[],
    "skills": string[],
    "education": string[],
    "workExperience": string[],
    "certifications": string[]
  }
}

Resume text:
{resume_text}"#;

/// System prompt for job matching.
pub const JOB_MATCH_SYSTEM: &str = "You are an expert hiring manager comparing a resume to a role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job match prompt. Replace `{focus}`, `{job_role}`, `{job_description_block}`, `{resume_text}`.
pub const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"Compare this resume to the target job role and provide a detailed match analysis. {focus}Return a JSON object with:
{
  "matchScore": number (0-100),
  "hireabilityProbability": number (0-100),
  "strengths": string[],
  "weaknesses": string[],
  "missingSkills": string[],
  "recommendations": {
    "toAdd": string[],
    "toRemove": string[],
    "toEnhance": string[]
  },
  "skillMatch": {"technical": number, "soft": number, "domain": number}
}

Target Role: {job_role}
{job_description_block}
Resume:
{resume_text}"#;

/// Inserted into `{focus}` when a job description accompanies the role.
pub const JOB_DESCRIPTION_FOCUS: &str =
    "Focus specifically on the provided job description. ";
