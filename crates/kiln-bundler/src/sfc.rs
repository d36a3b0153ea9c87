//! Vue Single File Component block parser.
//!
//! Splits a `.vue` source into its top-level `<script>`, `<template>` and
//! `<style>` blocks. Scanning uses memchr, never regex, and never panics on
//! malformed input.

use memchr::{memchr, memmem};

/// Maximum accepted `.vue` file size (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of `<script>` blocks in a single component.
pub const MAX_SCRIPT_TAGS: usize = 100;

/// Binding the compiled component object is assigned to before export.
///
/// Transforms that run after the Vue load hook (vuetify auto-import) attach
/// extra properties to this binding.
pub const SFC_BINDING: &str = "__sfc__";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SfcError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Too many script tags: {count} found (max: {max} allowed)")]
    TooManyScriptTags { count: usize, max: usize },

    #[error("Unclosed <{tag}> block starting at byte {position}")]
    UnclosedBlock { tag: &'static str, position: usize },
}

/// A `<script>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock<'a> {
    pub content: &'a str,
    /// Value of the `lang` attribute, `js` when absent
    pub lang: &'a str,
    pub setup: bool,
}

/// Top-level blocks of a Vue SFC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor<'a> {
    pub scripts: Vec<ScriptBlock<'a>>,
    /// Inner content of the outermost `<template>`
    pub template: Option<&'a str>,
    pub style_count: usize,
}

impl<'a> SfcDescriptor<'a> {
    pub fn parse(source: &'a str) -> Result<Self, SfcError> {
        if source.len() > MAX_FILE_SIZE {
            return Err(SfcError::FileTooLarge {
                size: source.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let bytes = source.as_bytes();
        let mut descriptor = SfcDescriptor::default();
        let mut pointer = 0;

        while let Some(offset) = memchr(b'<', &bytes[pointer..]) {
            let start = pointer + offset;
            let rest = &bytes[start..];

            if rest.starts_with(b"<!--") {
                pointer = match memmem::find(&bytes[start..], b"-->") {
                    Some(end) => start + end + 3,
                    None => bytes.len(),
                };
            } else if is_open_tag(rest, b"template") {
                let (content, end) = parse_template(source, start)?;
                if descriptor.template.is_none() {
                    descriptor.template = Some(content);
                }
                pointer = end;
            } else if is_open_tag(rest, b"script") {
                let (script, end) = parse_script(source, start)?;
                descriptor.scripts.push(script);
                if descriptor.scripts.len() > MAX_SCRIPT_TAGS {
                    return Err(SfcError::TooManyScriptTags {
                        count: descriptor.scripts.len(),
                        max: MAX_SCRIPT_TAGS,
                    });
                }
                pointer = end;
            } else if is_open_tag(rest, b"style") {
                let body = find_closing_angle(bytes, start).ok_or(SfcError::UnclosedBlock {
                    tag: "style",
                    position: start,
                })?;
                pointer = match memmem::find(&bytes[body..], b"</style>") {
                    Some(end) => body + end + "</style>".len(),
                    None => {
                        return Err(SfcError::UnclosedBlock {
                            tag: "style",
                            position: start,
                        });
                    }
                };
                descriptor.style_count += 1;
            } else {
                pointer = start + 1;
            }
        }

        Ok(descriptor)
    }

    pub fn has_setup_script(&self) -> bool {
        self.scripts.iter().any(|s| s.setup)
    }
}

/// `<name` followed by whitespace, `>` or `/`.
fn is_open_tag(rest: &[u8], name: &[u8]) -> bool {
    rest.len() > name.len() + 1
        && &rest[1..=name.len()] == name
        && matches!(
            rest[name.len() + 1],
            b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/'
        )
}

fn parse_script(source: &str, start: usize) -> Result<(ScriptBlock<'_>, usize), SfcError> {
    let bytes = source.as_bytes();
    let unclosed = SfcError::UnclosedBlock {
        tag: "script",
        position: start,
    };

    let attrs_start = start + "<script".len();
    let tag_end = find_closing_angle(bytes, attrs_start).ok_or(unclosed.clone())?;
    let attrs = &source[attrs_start..tag_end];
    let setup = has_attribute(attrs, "setup");
    let lang = extract_lang_attribute(attrs);

    if bytes[tag_end - 1] == b'/' {
        return Ok((
            ScriptBlock {
                content: "",
                lang,
                setup,
            },
            tag_end + 1,
        ));
    }

    let content_start = tag_end + 1;
    let content_end = memmem::find(&bytes[content_start..], b"</script>")
        .map(|pos| content_start + pos)
        .ok_or(unclosed)?;

    Ok((
        ScriptBlock {
            content: &source[content_start..content_end],
            lang,
            setup,
        },
        content_end + "</script>".len(),
    ))
}

/// Returns the inner content of a `<template>` and the offset after its
/// matching close tag. Nested `<template>` elements are balanced.
fn parse_template(source: &str, start: usize) -> Result<(&str, usize), SfcError> {
    let bytes = source.as_bytes();
    let unclosed = SfcError::UnclosedBlock {
        tag: "template",
        position: start,
    };

    let tag_end = find_closing_angle(bytes, start + "<template".len()).ok_or(unclosed.clone())?;
    let content_start = tag_end + 1;
    let mut depth = 1usize;
    let mut pointer = content_start;

    while let Some(offset) = memmem::find(&bytes[pointer..], b"template") {
        let at = pointer + offset;
        pointer = at + "template".len();
        if at >= 2 && &bytes[at - 2..at] == b"</" {
            depth -= 1;
            if depth == 0 {
                let end = find_closing_angle(bytes, pointer).ok_or(unclosed)?;
                return Ok((&source[content_start..at - 2], end + 1));
            }
        } else if at >= 1 && bytes[at - 1] == b'<' && is_open_tag(&bytes[at - 1..], b"template") {
            depth += 1;
        }
    }

    Err(unclosed)
}

/// Finds the closing `>` of a tag, skipping quoted attribute values.
fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_quote = false;
    let mut quote_char = 0u8;

    for (i, &byte) in bytes.get(start..)?.iter().enumerate() {
        match byte {
            b'"' | b'\'' => {
                if !in_quote {
                    in_quote = true;
                    quote_char = byte;
                } else if byte == quote_char {
                    in_quote = false;
                }
            }
            b'>' if !in_quote => return Some(start + i),
            _ => {}
        }
    }

    None
}

fn has_attribute(attrs: &str, name: &str) -> bool {
    attrs
        .split(|c: char| c.is_whitespace() || c == '/')
        .any(|token| token == name || token.starts_with(&format!("{name}=")))
}

fn extract_lang_attribute(attrs: &str) -> &str {
    let Some(lang_pos) = attrs.find("lang=") else {
        return "js";
    };
    let value = attrs[lang_pos + "lang=".len()..].trim_start();

    match value.chars().next() {
        Some(quote @ ('"' | '\'')) => value[1..]
            .find(quote)
            .map(|end| &value[1..=end])
            .unwrap_or("js"),
        Some(_) => {
            let end = value
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(value.len());
            &value[..end]
        }
        None => "js",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_template_script_and_style() {
        let vue = r#"
<template>
  <v-btn @click="go">Go</v-btn>
</template>

<script lang="ts">
export default { name: 'GoButton' }
</script>

<style scoped>
.v-btn { color: red; }
</style>
"#;
        let sfc = SfcDescriptor::parse(vue).unwrap();
        assert_eq!(sfc.scripts.len(), 1);
        assert_eq!(sfc.scripts[0].lang, "ts");
        assert!(!sfc.scripts[0].setup);
        assert!(sfc.scripts[0].content.contains("GoButton"));
        assert_eq!(sfc.template.map(str::trim), Some(r#"<v-btn @click="go">Go</v-btn>"#));
        assert_eq!(sfc.style_count, 1);
    }

    #[test]
    fn nested_templates_are_balanced() {
        let vue = "<template><v-list><template #item><b>x</b></template></v-list></template>";
        let sfc = SfcDescriptor::parse(vue).unwrap();
        assert_eq!(
            sfc.template,
            Some("<v-list><template #item><b>x</b></template></v-list>")
        );
    }

    #[test]
    fn detects_setup_script() {
        let sfc = SfcDescriptor::parse("<script setup lang=\"ts\">const a = 1</script>").unwrap();
        assert!(sfc.has_setup_script());
        assert_eq!(sfc.scripts[0].lang, "ts");
    }

    #[test]
    fn setup_inside_attribute_value_is_not_setup() {
        let sfc = SfcDescriptor::parse("<script data-x=\"setup\">x</script>").unwrap();
        assert!(!sfc.has_setup_script());
    }

    #[test]
    fn comments_are_skipped() {
        let sfc = SfcDescriptor::parse("<!-- <script setup> --><script>a</script>").unwrap();
        assert_eq!(sfc.scripts.len(), 1);
        assert!(!sfc.has_setup_script());
    }

    #[test]
    fn unclosed_script_is_an_error() {
        assert!(matches!(
            SfcDescriptor::parse("<script>export default {}"),
            Err(SfcError::UnclosedBlock { tag: "script", .. })
        ));
    }

    #[test]
    fn file_too_large() {
        let large = "x".repeat(MAX_FILE_SIZE + 1);
        assert!(matches!(
            SfcDescriptor::parse(&large),
            Err(SfcError::FileTooLarge { .. })
        ));
    }
}
