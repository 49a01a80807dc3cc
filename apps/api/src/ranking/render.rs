//! HTML pages for the browser flow: the upload form and the ranking table.

use std::fmt::Write;

use crate::ranking::handlers::EvaluationResponse;
use crate::ranking::upload::{FIELD_JOB_DESCRIPTION, FIELD_KEYWORDS, FIELD_RESUMES};

const PAGE_STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;}\
textarea,input{width:100%;margin-bottom:1rem;}\
table{border-collapse:collapse;width:100%;}\
th,td{border:1px solid #ccc;padding:.4rem;text-align:left;}";

pub fn render_index_page() -> String {
    let body = format!(
        r#"<h1>Resume Ranker</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
  <label for="{jd}">Job description</label>
  <textarea id="{jd}" name="{jd}" rows="10" required></textarea>
  <label for="{kw}">Keywords (comma separated)</label>
  <input id="{kw}" name="{kw}" type="text" placeholder="python, aws, docker">
  <label for="{files}">Resumes (PDF or plain text)</label>
  <input id="{files}" name="{files}" type="file" accept=".pdf,.txt" multiple required>
  <button type="submit">Rank resumes</button>
</form>"#,
        jd = FIELD_JOB_DESCRIPTION,
        kw = FIELD_KEYWORDS,
        files = FIELD_RESUMES,
    );
    page("Resume Ranker", &body)
}

pub fn render_results_page(response: &EvaluationResponse) -> String {
    let mut body = String::from("<h1>Ranking</h1>\n");

    if let Some(diagnostic) = &response.diagnostic {
        let _ = writeln!(
            body,
            "<p>No scores could be produced: {}</p>",
            escape_html(&diagnostic.message)
        );
    } else {
        body.push_str(
            "<table>\n<tr><th>Rank</th><th>Resume</th><th>Score</th><th>Similarity</th><th>Keyword coverage</th></tr>\n",
        );
        for (rank, result) in response.results.iter().enumerate() {
            let label = result
                .file_name
                .as_deref()
                .map(escape_html)
                .unwrap_or_else(|| format!("Resume #{}", result.document_index + 1));
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.4}</td><td>{:.4}</td></tr>",
                rank + 1,
                label,
                result.score,
                result.similarity,
                result.keyword_coverage
            );
        }
        body.push_str("</table>\n");
    }

    let _ = write!(
        body,
        "<p><small>Run {} at {}</small></p>\n<p><a href=\"/\">Rank another set</a></p>",
        response.run_id,
        response.evaluated_at.to_rfc3339()
    );
    page("Ranking", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::handlers::{Diagnostic, RankedResume};
    use chrono::Utc;
    use uuid::Uuid;

    fn response(results: Vec<RankedResume>, diagnostic: Option<Diagnostic>) -> EvaluationResponse {
        EvaluationResponse {
            run_id: Uuid::new_v4(),
            evaluated_at: Utc::now(),
            document_count: results.len(),
            results,
            diagnostic,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_index_page_has_form_fields() {
        let html = render_index_page();
        assert!(html.contains(r#"name="job_description""#));
        assert!(html.contains(r#"name="keywords""#));
        assert!(html.contains(r#"name="resumes""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
    }

    #[test]
    fn test_results_page_escapes_file_names() {
        let html = render_results_page(&response(
            vec![RankedResume {
                document_index: 0,
                file_name: Some("<script>.pdf".to_string()),
                score: 38.46,
                similarity: 0.4646,
                keyword_coverage: 0.2,
            }],
            None,
        ));
        assert!(html.contains("&lt;script&gt;.pdf"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("38.46"));
    }

    #[test]
    fn test_results_page_falls_back_to_index_label() {
        let html = render_results_page(&response(
            vec![RankedResume {
                document_index: 2,
                file_name: None,
                score: 0.0,
                similarity: 0.0,
                keyword_coverage: 0.0,
            }],
            None,
        ));
        assert!(html.contains("Resume #3"));
    }

    #[test]
    fn test_results_page_shows_diagnostic() {
        let html = render_results_page(&response(
            vec![],
            Some(Diagnostic {
                code: "NO_CANDIDATE_TEXT",
                message: "invalid input: no resume produced any extractable text".to_string(),
            }),
        ));
        assert!(html.contains("No scores could be produced"));
        assert!(!html.contains("<table>"));
    }
}
