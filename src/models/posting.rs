//! Job posting data structure.

use serde::{Deserialize, Serialize};

/// One posting parsed from a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    /// Site-assigned posting identifier
    pub id: String,

    /// Employer display name
    pub company: String,

    /// Posting title
    pub title: String,

    /// `month/day`, empty when the listing date could not be read
    pub registered_date: String,

    /// Detail page URL
    pub url: String,
}

impl JobPosting {
    /// Format posting for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{company}`, `{title}`, `{date}`, `{url}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{company}", &self.company)
            .replace("{title}", &self.title)
            .replace("{date}", &self.registered_date)
            .replace("{url}", &self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> JobPosting {
        JobPosting {
            id: "245123".to_string(),
            company: "넥슨코리아".to_string(),
            title: "클라이언트 프로그래머".to_string(),
            registered_date: "3/12".to_string(),
            url: "https://www.gamejob.co.kr/List_GI/GIB_Read.asp?GI_No=245123".to_string(),
        }
    }

    #[test]
    fn test_format() {
        let posting = sample_posting();
        let result = posting.format("[{date}] {company}: {title}");
        assert_eq!(result, "[3/12] 넥슨코리아: 클라이언트 프로그래머");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(sample_posting()).unwrap();
        assert_eq!(json["registeredDate"], "3/12");
        assert_eq!(json["id"], "245123");
    }
}
