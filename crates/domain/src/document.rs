//! Small document model for textual reports
//!
//! Reports are assembled as a title, a few header notes, and an ordered list
//! of sections. Each section holds blocks (key/value fields, lists, tables,
//! paragraphs). A [`Formatter`] turns the document into text, so content
//! never carries layout.

/// A complete report document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub title: String,
    pub notes: Vec<String>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Add an italic header note (generation time, account, ...)
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Section titles in order
    pub fn outline(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }
}

/// A titled section; `level` 2 is a top-level section, 3 a subsection
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub level: u8,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level: 2,
            blocks: Vec::new(),
        }
    }

    pub fn sub(title: impl Into<String>) -> Self {
        Self {
            level: 3,
            ..Self::new(title)
        }
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn fields<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.block(Block::Fields(
            fields
                .into_iter()
                .map(|(label, value)| Field {
                    label: label.into(),
                    value: value.into(),
                })
                .collect(),
        ))
    }

    pub fn bullets<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block(Block::Bullets(items.into_iter().map(Into::into).collect()))
    }

    pub fn numbered<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block(Block::Numbered(items.into_iter().map(Into::into).collect()))
    }

    pub fn checklist<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block(Block::Checklist(items.into_iter().map(Into::into).collect()))
    }

    pub fn paragraph(self, text: impl Into<String>) -> Self {
        self.block(Block::Paragraph(text.into()))
    }
}

/// A labelled value rendered as `**label**: value`
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Fields(Vec<Field>),
    Bullets(Vec<String>),
    Numbered(Vec<String>),
    Checklist(Vec<String>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Paragraph(String),
    /// Horizontal rule
    Rule,
}

/// Turns a [`Document`] into text
pub trait Formatter {
    fn format(&self, document: &Document) -> String;
}

/// Markdown output
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format(&self, document: &Document) -> String {
        let mut out = format!("# {}\n", document.title);

        if !document.notes.is_empty() {
            out.push('\n');
            for note in &document.notes {
                out.push_str(&format!("*{}*\n", note));
            }
        }

        for section in &document.sections {
            let hashes = "#".repeat(section.level.max(1) as usize);
            out.push_str(&format!("\n{} {}\n", hashes, section.title));

            for block in &section.blocks {
                out.push('\n');
                format_block(&mut out, block);
            }
        }

        out
    }
}

fn format_block(out: &mut String, block: &Block) {
    match block {
        Block::Fields(fields) => {
            for field in fields {
                out.push_str(&format!("- **{}**: {}\n", field.label, field.value));
            }
        }
        Block::Bullets(items) => {
            for item in items {
                out.push_str(&format!("- {}\n", item));
            }
        }
        Block::Numbered(items) => {
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, item));
            }
        }
        Block::Checklist(items) => {
            for item in items {
                out.push_str(&format!("- [ ] {}\n", item));
            }
        }
        Block::Table { headers, rows } => {
            out.push_str(&format!("| {} |\n", headers.join(" | ")));
            let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
            out.push_str(&format!("| {} |\n", separators.join(" | ")));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
        }
        Block::Paragraph(text) => {
            out.push_str(text);
            out.push('\n');
        }
        Block::Rule => out.push_str("---\n"),
    }
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Splits fall on char boundaries only; `max_chars == 0` keeps the text whole.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || text.is_empty() {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % max_chars == 0 {
            chunks.push(&text[start..offset]);
            start = offset;
        }
    }
    chunks.push(&text[start..]);
    chunks
}
