/// A resolved OWASP Top-10 entry for display and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwaspIssue {
    pub label: String,
    pub description: String,
    pub link: String,
}

const OWASP_TABLE: &[(&str, &str, &str, &str)] = &[
    (
        "Broken Access Control",
        "Broken access control",
        "Users can reach resources they are not authorized for.",
        "https://owasp.org/Top10/A01_2021-Broken_Access_Control/",
    ),
    (
        "Cryptographic Failures",
        "Cryptographic failures",
        "Data left unencrypted or protected with weak mechanisms.",
        "https://owasp.org/Top10/A02_2021-Cryptographic_Failures/",
    ),
    (
        "Security Misconfiguration",
        "Security misconfiguration",
        "Default settings kept or unnecessary services enabled.",
        "https://owasp.org/Top10/A05_2021-Security_Misconfiguration/",
    ),
    (
        "Identification and Authentication Failures",
        "Identification and authentication failures",
        "Poor handling of credentials and sessions.",
        "https://owasp.org/Top10/A07_2021-Identification_and_Authentication_Failures/",
    ),
    (
        "API Insecurity",
        "API insecurity",
        "APIs exposed without sufficient control or protection.",
        "https://owasp.org/Top10/A10_2021-Server-Side_Request_Forgery_(SSRF)/",
    ),
];

/// Resolve a backend issue key against the static OWASP table.
///
/// Unknown keys degrade to the raw key as label with empty description and
/// link, so new backend keys still render instead of failing.
#[must_use]
pub fn resolve_owasp_issue(key: &str) -> OwaspIssue {
    match OWASP_TABLE.iter().find(|(k, _, _, _)| *k == key) {
        Some((_, label, description, link)) => OwaspIssue {
            label: (*label).to_owned(),
            description: (*description).to_owned(),
            link: (*link).to_owned(),
        },
        None => OwaspIssue {
            label: key.to_owned(),
            description: String::new(),
            link: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_resolves_to_table_entry() {
        let issue = resolve_owasp_issue("Cryptographic Failures");
        assert_eq!(issue.label, "Cryptographic failures");
        assert!(!issue.description.is_empty());
        assert!(issue.link.contains("A02_2021"));
    }

    #[test]
    fn unknown_key_falls_back_to_raw_label() {
        let issue = resolve_owasp_issue("Quantum Entanglement");
        assert_eq!(issue.label, "Quantum Entanglement");
        assert!(issue.description.is_empty());
        assert!(issue.link.is_empty());
    }
}
