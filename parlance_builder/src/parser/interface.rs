use crate::parser::base::ParseError;
use crate::parser::printer::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // at least one space between columns
        if width >= 1 {
            Ok(PaddingWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // hyphenation needs room for one character plus the hyphen
        if width >= 2 {
            Ok(MiddleWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TotalWidth(pub(crate) usize);

/// Lays text out in two columns: names on the left, wrapped descriptions on the right.
///
/// The left width includes any indentation; every description starts in the same column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// Leave a margin rather than filling the terminal edge to edge.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Three average (5 character) words with spaces between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Choose the middle width from the space the terminal leaves after the left column.
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        let selected = if guided_middle + non_middle <= target_total_width {
            guided_middle
        } else if non_middle < target_total_width {
            std::cmp::max(target_total_width - non_middle, MINIMUM_MIDDLE_WIDTH)
        } else {
            MINIMUM_MIDDLE_WIDTH
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Left column {non_middle} within total {total_width:?}.  Selecting middle: {selected}.");
        }

        Self::new(padding, left, MiddleWidth(selected))
    }

    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = format!("{:width$}", "", width = self.padding.0);
        let left_width = self.left.0.saturating_sub(indent);
        let mut out = Vec::default();

        for (i, part) in chunk(middle, self.middle.0).into_iter().enumerate() {
            if i == 0 {
                out.push(format!("{:indent$}{left:left_width$}{padding}{part}", ""));
            } else {
                out.push(format!("{:width$}{padding}{part}", "", width = self.left.0));
            }
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        let length = word.chars().count();

        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + length + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while characters.len() - left > width {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// The presentation sink for help and errors.
pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: ParseError);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

#[cfg(test)]
pub(crate) mod util {
    use super::UserInterface;
    use crate::parser::base::ParseError;
    use crate::parser::printer::ErrorContext;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct InMemoryInterface {
        message: RefCell<Vec<String>>,
        error: RefCell<Option<String>>,
        error_context: RefCell<Option<ErrorContext>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            self.message.borrow_mut().push(message);
        }

        fn print_error(&self, error: ParseError) {
            // Assumes print_error() is only ever called once.
            self.error.borrow_mut().replace(error.to_string());
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            self.error_context.borrow_mut().replace(error_context);
        }
    }

    impl InMemoryInterface {
        pub(crate) fn consume(self) -> (Option<String>, Option<String>, Option<ErrorContext>) {
            let InMemoryInterface {
                message,
                error,
                error_context,
            } = self;
            let message = message.into_inner();

            (
                if message.is_empty() {
                    None
                } else {
                    Some(message.join("\n"))
                },
                error.into_inner(),
                error_context.into_inner(),
            )
        }

        pub(crate) fn consume_message(self) -> String {
            let (message, error, error_context) = self.consume();
            assert_eq!(error, None);
            assert_eq!(error_context, None);
            message.unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn renderer(left: usize, middle: usize) -> ColumnRenderer {
        ColumnRenderer::new(
            PaddingWidth::new(2).unwrap(),
            LeftWidth::new(left).unwrap(),
            MiddleWidth::new(middle).unwrap(),
        )
    }

    #[test]
    fn widths_reject_too_small() {
        assert!(PaddingWidth::new(0).is_err());
        assert!(LeftWidth::new(0).is_err());
        assert!(MiddleWidth::new(1).is_err());
        assert!(MiddleWidth::new(2).is_ok());
    }

    #[test]
    fn render_simple() {
        let lines = renderer(6, 20).render(1, "-a", "short text");
        assert_eq!(lines, vec![" -a     short text"]);
    }

    #[test]
    fn render_wraps() {
        // Setup
        let renderer = renderer(6, 10);

        // Execute
        let lines = renderer.render(1, "-a", "one two three four");

        // Verify
        assert_eq!(
            lines,
            vec![
                " -a     one two",
                "        three four",
            ]
        );
    }

    #[test]
    fn render_indent_keeps_column() {
        let renderer = renderer(6, 20);
        let outer = renderer.render(1, "-a", "x");
        let inner = renderer.render(3, "b", "y");
        assert_eq!(outer, vec![" -a     x"]);
        assert_eq!(inner, vec!["   b    y"]);
    }

    #[test]
    fn render_empty_middle() {
        assert_eq!(renderer(6, 20).render(1, "-a", ""), vec![" -a"]);
    }

    #[rstest]
    #[case("", 5, vec![])]
    #[case("abc", 5, vec!["abc"])]
    #[case("abc def", 5, vec!["abc", "def"])]
    #[case("ab cd ef", 5, vec!["ab cd", "ef"])]
    #[case("abcdefgh", 4, vec!["abc-", "def-", "gh"])]
    #[case("abcd", 4, vec!["abcd"])]
    #[case("ééééé", 3, vec!["éé-", "ééé"])]
    #[case("  a   b  ", 5, vec!["a b"])]
    fn chunking(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[rstest]
    #[case(200, 30, 30)]
    #[case(200, 5, MINIMUM_MIDDLE_WIDTH)]
    #[case(60, 100, 41)]
    #[case(10, 100, MINIMUM_MIDDLE_WIDTH)]
    fn guided(#[case] total: usize, #[case] middle: usize, #[case] expected: usize) {
        let renderer = ColumnRenderer::guided(
            PaddingWidth::new(2).unwrap(),
            LeftWidth::new(14).unwrap(),
            MiddleWidth::new(middle).unwrap(),
            TotalWidth(total),
        );
        assert_eq!(renderer.middle.0, expected);
    }
}
