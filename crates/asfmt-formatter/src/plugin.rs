//! Host plugin: decorator-aware parser and marker comment printer

use std::sync::Arc;

use asfmt_host::{
    CommentPath, CommentPrinter, DefaultCommentPrinter, Doc, FormatConfig, FormatError,
    FormatResult, Plugin, PrintContext, SourceFile, SourceParser, StrictParser,
};

use crate::locator::locate;
use crate::marker::{encode, Marker};

/// Parser that hides decorators from the host parser inside marker comments
pub struct DecoratorParser {
    host: Arc<dyn SourceParser>,
}

impl DecoratorParser {
    pub fn new(host: Arc<dyn SourceParser>) -> Self {
        Self { host }
    }
}

impl Default for DecoratorParser {
    fn default() -> Self {
        Self::new(Arc::new(StrictParser))
    }
}

impl SourceParser for DecoratorParser {
    fn parse(&self, text: &str, config: &FormatConfig) -> FormatResult<SourceFile> {
        let ranges = match locate(text) {
            Some(ranges) if !ranges.is_empty() => ranges,
            _ => return self.host.parse(text, config),
        };

        let marker = Marker::for_source(text)?;
        let encoded = encode(text, &ranges, &marker)?;

        let mut file = match self.host.parse(encoded.text(), config) {
            Ok(file) => file,
            Err(FormatError::Syntax(diagnostics)) => {
                // Report positions in the text the user wrote
                let diagnostics = diagnostics
                    .into_iter()
                    .map(|mut diag| {
                        diag.span = encoded.span_to_original(diag.span);
                        diag.with_position(text)
                    })
                    .collect();
                return Err(FormatError::Syntax(diagnostics));
            }
            Err(other) => return Err(other),
        };

        // Marker comments report the decorator's own range
        for comment in &mut file.comments {
            if comment.is_block() && marker.unwrap_value(comment.value()).is_some() {
                comment.span.start += marker.open().len();
                comment.span.end -= marker.close().len();
            }
        }

        file.extensions.insert(marker);
        Ok(file)
    }
}

/// Prints marker comments as the decorators they carry
pub struct MarkerPrinter {
    fallback: Arc<dyn CommentPrinter>,
}

impl MarkerPrinter {
    /// `fallback` prints every comment that is not a marker
    pub fn new(fallback: Arc<dyn CommentPrinter>) -> Self {
        Self { fallback }
    }
}

impl Default for MarkerPrinter {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCommentPrinter))
    }
}

impl CommentPrinter for MarkerPrinter {
    fn print_comment(&self, path: &CommentPath<'_>, ctx: &PrintContext<'_>) -> Doc {
        let decorator = ctx
            .source()
            .extensions
            .get::<Marker>()
            .filter(|_| path.comment.is_block())
            .and_then(|marker| marker.unwrap_value(path.comment.value()));

        match decorator {
            // The first decoration of a run must start its own line
            Some(text) if path.is_first() => Doc::Concat(vec![Doc::Hardline, Doc::text(text)]),
            Some(text) => Doc::text(text),
            None => self.fallback.print_comment(path, ctx),
        }
    }
}

/// Wrap `host`'s parser and printer with decorator support
pub fn decorator_plugin(host: &Plugin) -> Plugin {
    Plugin::new(
        Arc::new(DecoratorParser::new(Arc::clone(&host.parser))),
        Arc::new(MarkerPrinter::new(Arc::clone(&host.printer))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use asfmt_host::Span;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> SourceFile {
        DecoratorParser::default()
            .parse(text, &FormatConfig::default())
            .expect("parses")
    }

    #[test]
    fn test_plain_source_is_delegated() {
        let file = parse("// c\nlet x = 1;");
        assert!(file.extensions.get::<Marker>().is_none());
        assert_eq!(file.text, "// c\nlet x = 1;");
    }

    #[test]
    fn test_marker_comment_spans_cover_decorator() {
        let file = parse("@lazy let x = 1;");
        let marker = file.extensions.get::<Marker>().expect("marker attached");
        let comment = &file.comments[0];
        assert_eq!(comment.span.len(), "@lazy".len());
        assert_eq!(comment.span.text(&file.text), "@lazy");
        assert_eq!(comment.text, marker.wrap("@lazy"));
    }

    #[test]
    fn test_syntax_errors_point_into_original_text() {
        let source = "@lazy let x = ;";
        let err = DecoratorParser::default()
            .parse(source, &FormatConfig::default())
            .unwrap_err();
        match err {
            FormatError::Syntax(diags) => {
                assert_eq!(diags[0].span, Span::new(14, 15));
                assert_eq!((diags[0].line, diags[0].column), (1, 15));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unencodable_decorator_surfaces_as_plugin_error() {
        let err = DecoratorParser::default()
            .parse("@a(\"*/\") let x = 1;", &FormatConfig::default())
            .unwrap_err();
        assert!(matches!(
            TransformError::from(err),
            TransformError::UnencodableDecorator { .. }
        ));
    }
}
