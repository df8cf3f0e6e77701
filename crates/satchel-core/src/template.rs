//! Log line templates
//!
//! Templates are parsed once when configuration is resolved, so rendering a
//! line is a walk over pre-split segments.

/// A field that can be substituted into a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Local time formatted with the configured timestamp format
    Timestamp,
    /// Plain upper-case level name
    Level,
    /// Bracketed, padded level tag (colorized on the console)
    Tag,
    /// Application name label
    App,
    /// Caller-supplied scope
    Scope,
    /// Message text
    Message,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "timestamp" => Some(Placeholder::Timestamp),
            "level" => Some(Placeholder::Level),
            "tag" => Some(Placeholder::Tag),
            "app" => Some(Placeholder::App),
            "scope" => Some(Placeholder::Scope),
            "msg" => Some(Placeholder::Message),
            _ => None,
        }
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed line template such as `"{timestamp} {tag} {scope}: {msg}"`
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl LineTemplate {
    /// Parse a template, rejecting unknown or unterminated placeholders
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find(['{', '}']) {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                literal.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }
            if tail.starts_with('}') {
                literal.push('}');
                rest = &tail[1..];
                continue;
            }

            let close = tail
                .find('}')
                .ok_or_else(|| format!("unterminated placeholder in `{source}`"))?;
            let name = &tail[1..close];
            let field = Placeholder::from_name(name)
                .ok_or_else(|| format!("unknown placeholder `{{{name}}}`"))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            rest = &tail[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the template references `field`
    pub fn uses(&self, field: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(f) if *f == field))
    }

    /// Render the template, asking `write_field` to append each field value
    pub fn render_with(&self, mut write_field: impl FnMut(Placeholder, &mut String)) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => write_field(*field, &mut out),
            }
        }
        out
    }
}

impl std::str::FromStr for LineTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for LineTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
