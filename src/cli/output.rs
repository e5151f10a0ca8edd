//! Output formatting for CLI

use crate::import::ImportResult;

/// Entity counts per kind, data producer names and skipped problems
pub fn format_summary(result: &ImportResult) -> String {
    let mut output = String::new();

    if !result.errors.is_empty() {
        output.push_str("\n⚠️  Skipped:\n");
        for error in &result.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    output.push_str(&format!(
        "\n✅ Parsed {} top-level entit{}:\n",
        result.document.len(),
        if result.document.len() == 1 { "y" } else { "ies" }
    ));
    for (kind, count) in result.document.counts() {
        output.push_str(&format!("  {}: {}\n", kind, count));
    }

    let producers = result.document.list_data_producers();
    if !producers.is_empty() {
        output.push_str("\nData producers:\n");
        for producer in producers {
            let kind = producer
                .data_producer_type
                .map(|t| t.as_str())
                .unwrap_or("DataProducer");
            output.push_str(&format!(
                "  - {} ({}, {} output(s))\n",
                producer.name.as_deref().unwrap_or("<unnamed>"),
                kind,
                producer.outputs.len()
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarshalConfig;
    use crate::import::import_str;

    #[test]
    fn test_format_summary_counts() {
        let xml = r#"<Metadata>
            <Deployment name="M1"><output><DataFile uriString="u1"/></output></Deployment>
            <Keyword name="ctd"/>
            <Keyword name="adcp"/>
        </Metadata>"#;
        let result = import_str(xml, &MarshalConfig::default()).unwrap();
        let summary = format_summary(&result);
        assert!(summary.contains("Parsed 3 top-level entities"));
        assert!(summary.contains("Keyword: 2"));
        assert!(summary.contains("M1 (Deployment, 1 output(s))"));
    }
}
