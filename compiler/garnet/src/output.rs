//! The result of one parse.

use garnet_diagnostic::span_utils::LineOffsetTable;
use garnet_diagnostic::Diagnostic;
use garnet_ir::sexp::to_sexp;
use garnet_ir::{NodeArena, NodeId, Span, StringInterner};
use garnet_lexer::MagicSettings;
use garnet_parse::ParsedProgram;

/// Tree, diagnostics and the side data a consumer needs to read them.
#[derive(Debug)]
pub struct ParseOutput {
    pub ast: NodeArena,
    /// `None` when the parse failed with a fatal diagnostic.
    pub root: Option<NodeId>,
    /// Sorted by source position.
    pub diagnostics: Vec<Diagnostic>,
    pub interner: StringInterner,
    /// Settings in force at the end of the source.
    pub magic: MagicSettings,
    /// Offset just past the `__END__` line. Lines after it are left
    /// unread in the line source.
    pub data_offset: Option<usize>,
    file_name: String,
    source: Vec<u8>,
    lines: LineOffsetTable,
}

impl ParseOutput {
    pub(crate) fn new(program: ParsedProgram, file_name: String) -> Self {
        let lexer = program.lexer;
        ParseOutput {
            ast: program.arena,
            root: program.root,
            diagnostics: program.diagnostics,
            interner: lexer.interner,
            magic: lexer.magic,
            data_offset: lexer.data_offset,
            file_name,
            source: lexer.source,
            lines: lexer.lines,
        }
    }

    /// A tree was built and no error was reported.
    pub fn is_valid(&self) -> bool {
        self.root.is_some() && !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// The tree as an S-expression.
    pub fn sexp(&self) -> Option<String> {
        self.root.map(|root| to_sexp(&self.ast, root, &self.interner))
    }

    /// The source text covered by `span`.
    pub fn snippet(&self, span: Span) -> &[u8] {
        self.source.get(span.to_range()).unwrap_or_default()
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.lines.offset_to_line_col(&self.source, offset)
    }

    /// Every diagnostic as `file:line:col: severity[code]: message`.
    pub fn render_diagnostics(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.render(&self.file_name, &self.source, &self.lines))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
