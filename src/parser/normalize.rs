const CODE_START: &str = "CODE";
const CODE_END: &str = "/CODE";

/// Trim blank lines around scraped code, collapse blank runs inside it, and
/// wrap the result in `CODE` / `/CODE` marker lines. Indentation is kept.
pub fn normalize_code_block(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();

    let start = lines
        .iter()
        .position(|l| !is_blank(l))
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !is_blank(l))
        .map_or(start, |i| i + 1);

    let mut body: Vec<&str> = Vec::with_capacity(end - start);
    let mut previous_blank = false;
    for line in &lines[start..end] {
        if is_blank(line) {
            if !previous_blank {
                body.push("");
            }
            previous_blank = true;
        } else {
            body.push(line);
            previous_blank = false;
        }
    }

    format!("{}\n{}\n{}", CODE_START, body.join("\n"), CODE_END)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
