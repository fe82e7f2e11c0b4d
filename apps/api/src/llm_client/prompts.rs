// Cross-cutting prompt fragments. Feature-specific prompts live next to the
// code that sends them (see generation::prompts).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt fragment that enforces a bare text answer.
pub const NO_PREAMBLE_SYSTEM: &str = "Respond with the requested text only. \
    Do NOT add a preamble, a closing remark, or commentary about what you wrote.";

/// Substitutes `{name}` placeholders in one left-to-right pass over `template`.
///
/// Inserted values are never rescanned, so user-supplied text containing
/// `{...}` comes through verbatim. Braces that do not name a known
/// placeholder (JSON examples in prompts) are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match substitution {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
