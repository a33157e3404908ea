use crate::errors::*;
use crate::report::VulnerableDependency;
use std::fmt::Write;

const HEADER: &[&str] = &["File Name", "File Path", "Description", "Vulnerabilities"];

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render one table row per (dependency, vulnerability) pair
pub fn render_table(deps: &[VulnerableDependency]) -> Result<String> {
    let mut out = String::new();
    write_table(&mut out, deps)?;
    Ok(out)
}

fn write_table(out: &mut String, deps: &[VulnerableDependency]) -> std::fmt::Result {
    writeln!(out, "<table>")?;
    write!(out, "<tr>")?;
    for title in HEADER {
        write!(out, "<th>{}</th>", title)?;
    }
    writeln!(out, "</tr>")?;

    for dep in deps {
        let file_name = html_escape(&dep.file_name);
        let file_path = html_escape(&dep.file_path);
        let description = html_escape(&dep.description);

        for vuln in &dep.vulnerabilities {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><b>{}</b> ({}): {}</td></tr>",
                file_name,
                file_path,
                description,
                html_escape(&vuln.name),
                html_escape(&vuln.severity),
                html_escape(&vuln.description),
            )?;
        }
    }

    writeln!(out, "</table>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Vulnerability;

    fn vuln(name: &str) -> Vulnerability {
        Vulnerability {
            name: name.to_string(),
            severity: "HIGH".to_string(),
            description: format!("{} description", name),
        }
    }

    fn dep(file_name: &str, vulns: Vec<Vulnerability>) -> VulnerableDependency {
        VulnerableDependency {
            file_name: file_name.to_string(),
            file_path: format!("/libs/{}", file_name),
            description: String::new(),
            vulnerabilities: vulns,
        }
    }

    fn rows_containing(html: &str, needle: &str) -> usize {
        html.lines()
            .filter(|l| l.starts_with("<tr><td>") && l.contains(needle))
            .count()
    }

    #[test]
    fn test_header_only_for_empty_list() -> Result<()> {
        let html = render_table(&[])?;
        assert_eq!(
            html,
            "<table>\n<tr><th>File Name</th><th>File Path</th><th>Description</th><th>Vulnerabilities</th></tr>\n</table>\n"
        );
        Ok(())
    }

    #[test]
    fn test_row_per_vulnerability() -> Result<()> {
        let html = render_table(&[
            dep("a.jar", vec![vuln("CVE-1"), vuln("CVE-2"), vuln("CVE-3")]),
            dep("b.jar", vec![vuln("CVE-4")]),
        ])?;
        assert_eq!(rows_containing(&html, "a.jar"), 3);
        assert_eq!(rows_containing(&html, "b.jar"), 1);
        assert_eq!(html.matches("<tr>").count(), 5);

        let first = html.find("CVE-1").unwrap();
        let second = html.find("CVE-2").unwrap();
        let fourth = html.find("CVE-4").unwrap();
        assert!(first < second && second < fourth);
        Ok(())
    }

    #[test]
    fn test_fields_are_escaped() -> Result<()> {
        let mut d = dep("<script>.jar", vec![vuln("CVE-1")]);
        d.description = "Tom & \"Jerry\"".to_string();
        d.vulnerabilities[0].description = "<img src=x onerror='boom'>".to_string();

        let html = render_table(&[d])?;
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;.jar"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot;"));
        assert!(html.contains("onerror=&#39;boom&#39;"));
        Ok(())
    }
}
