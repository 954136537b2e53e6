//! HTML report generation.

use super::ReportData;

const TEMPLATE: &str = include_str!("report.html");
const CSS: &str = include_str!("report.css");
const JS: &str = include_str!("report.js");

/// Generate a self-contained HTML report
pub fn generate_html(data: &ReportData) -> anyhow::Result<String> {
    // "</" inside the embedded JSON would close the script element
    let json_data = serde_json::to_string(data)?.replace("</", "<\\/");
    let js = JS.replace("__JSON_DATA__", &json_data);

    Ok(TEMPLATE.replace("__CSS__", CSS).replace("__JS__", &js))
}
