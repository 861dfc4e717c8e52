//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::{RevokeOutput, TokenOutput};
    use super::super::text::{TextFormatter, summarize};
    use chrono::{TimeZone, Utc};
    use quickledger_entities::EntityRegistry;
    use serde_json::json;

    #[test]
    fn test_entities_table() {
        let formatter = TextFormatter::new(false);
        let entries = vec![
            EntityRegistry::get("Invoice").unwrap(),
            EntityRegistry::get("BalanceSheetReport").unwrap(),
        ];

        let output = formatter.format_entities(&entries);
        assert!(output.contains("Invoice"));
        assert!(output.contains("BalanceSheetReport"));
        assert!(output.contains("-----P"));
        assert!(output.contains("CRUDQ-"));
        assert!(output.ends_with("Total: 2 (1 entities, 1 reports)"));
    }

    #[test]
    fn test_no_colors_means_no_escapes() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_entities(&[EntityRegistry::get("Account").unwrap()]);
        assert!(!output.contains('\x1b'));

        let colored = TextFormatter::new(true).format_entities(&[EntityRegistry::get("Account").unwrap()]);
        assert!(colored.contains("\x1b[1m"));
    }

    #[test]
    fn test_summarize_query_response() {
        let value = json!({"QueryResponse": {"Customer": [{"Id": "1"}, {"Id": "2"}], "startPosition": 1}});
        assert_eq!(summarize(&value).as_deref(), Some("Customer: 2 records"));

        let single = json!({"QueryResponse": {"Vendor": [{"Id": "1"}]}});
        assert_eq!(summarize(&single).as_deref(), Some("Vendor: 1 record"));
    }

    #[test]
    fn test_summarize_report() {
        let value = json!({"Header": {"ReportName": "ProfitAndLoss", "StartPeriod": "2024-01-01", "EndPeriod": "2024-03-31"}});
        assert_eq!(
            summarize(&value).as_deref(),
            Some("ProfitAndLoss (2024-01-01 to 2024-03-31)")
        );
        assert_eq!(summarize(&json!({"Invoice": {"Id": "130"}})), None);
    }

    #[test]
    fn test_format_value_without_summary() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_value(&json!({"Invoice": {"Id": "130"}})).unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"Id\": \"130\""));
    }

    #[test]
    fn test_tokens_and_revoke() {
        let formatter = TextFormatter::new(false);
        let tokens = TokenOutput {
            realm_id: Some("4620".into()),
            token_type: Some("bearer".into()),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            access_token_expires_at: None,
            refresh_token_expires_at: None,
        };
        let output = formatter.format_tokens(&tokens);
        assert!(output.starts_with("Tokens saved"));
        assert!(output.contains("Company:         4620"));

        let revoked = RevokeOutput {
            revoked: false,
            response: None,
        };
        assert_eq!(
            formatter.format_revoke(&revoked),
            "No refresh token stored; nothing to revoke"
        );
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{JsonFormatter, TokenOutput};
    use chrono::{Duration, TimeZone, Utc};
    use quickledger_core::{Credentials, TokenSet};
    use quickledger_entities::EntityRegistry;
    use serde_json::{Value, json};

    #[test]
    fn test_format_pretty_and_compact() {
        let data = json!({"key": "value"});
        assert!(JsonFormatter::new(true).format(&data).unwrap().contains('\n'));
        assert!(!JsonFormatter::new(false).format(&data).unwrap().contains('\n'));
    }

    #[test]
    fn test_entities_json() {
        let formatter = JsonFormatter::new(false);
        let output = formatter
            .format_entities(&[EntityRegistry::get("TaxService").unwrap()])
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["handle"], "TaxService");
        assert_eq!(parsed[0]["fragment"], "taxservice/taxcode");
        assert_eq!(parsed[0]["kind"], "accounting");
        assert_eq!(parsed[0]["flags"], "C-----");
        assert_eq!(parsed[0]["capabilities"]["create"], true);
    }

    #[test]
    fn test_token_output_omits_secrets() {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let tokens = TokenSet {
            credentials: Credentials::new("ACCESS", "REFRESH", "4620"),
            token_type: Some("bearer".into()),
            expires_in: Some(3600),
            x_refresh_token_expires_in: Some(8_726_400),
            issued_at,
        };

        let output = JsonFormatter::new(false)
            .format(&TokenOutput::from(&tokens))
            .unwrap();
        assert!(!output.contains("ACCESS"));
        assert!(!output.contains("REFRESH"));

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["realmId"], "4620");
        assert_eq!(
            parsed["accessTokenExpiresAt"],
            (issued_at + Duration::seconds(3600)).to_rfc3339()
        );
    }
}
