//! Lightweight style source scanner.
//!
//! Produces a flat, source-ordered list of nodes (rules, declarations,
//! at-rules, comments) with parent links. This is not a full CSS parser; it
//! only tracks enough structure for the convention checks: block nesting,
//! `/* */` and `//` comments, quoted strings, parentheses and `#{}`
//! interpolation. `.vue` files contribute the contents of their `<style>`
//! blocks with line numbers relative to the `.vue` file.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static VUE_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("static pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Rule { selector: String },
    Declaration { property: String, value: String },
    AtRule { name: String, params: String, has_block: bool },
    Comment { text: String, inline: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub column: usize,
    /// Index of the enclosing rule or at-rule block.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    pub fn parse(source: &str) -> Self {
        Stylesheet {
            nodes: Scanner::new(source, 0).run(),
        }
    }

    /// Parse only the `<style>` blocks of a single-file component.
    pub fn parse_vue(source: &str) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        for caps in VUE_STYLE.captures_iter(source) {
            let Some(body) = caps.get(1) else { continue };
            let line_offset = source[..body.start()].matches('\n').count();
            let base = nodes.len();
            for mut node in Scanner::new(body.as_str(), line_offset).run() {
                node.parent = node.parent.map(|p| p + base);
                nodes.push(node);
            }
        }
        Stylesheet { nodes }
    }

    /// Dispatch on the file extension.
    pub fn parse_for_path(path: &str, source: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".vue") {
            Self::parse_vue(source)
        } else {
            Self::parse(source)
        }
    }

    /// Nearest enclosing `Rule` node, skipping at-rule blocks.
    pub fn enclosing_rule(&self, idx: usize) -> Option<usize> {
        let mut cur = self.nodes.get(idx)?.parent;
        while let Some(p) = cur {
            if matches!(self.nodes[p].kind, NodeKind::Rule { .. }) {
                return Some(p);
            }
            cur = self.nodes[p].parent;
        }
        None
    }

    /// Declaration node indices grouped by their parent block, in source order.
    pub fn declaration_groups(&self) -> BTreeMap<Option<usize>, Vec<usize>> {
        let mut groups: BTreeMap<Option<usize>, Vec<usize>> = BTreeMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Declaration { .. } = node.kind {
                groups.entry(node.parent).or_default().push(i);
            }
        }
        groups
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    nodes: Vec<Node>,
    stack: Vec<usize>,
    buf: String,
    start: Option<(usize, usize)>,
    parens: usize,
    interp: usize,
}

impl Scanner {
    fn new(source: &str, line_offset: usize) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: line_offset + 1,
            column: 1,
            nodes: Vec::new(),
            stack: Vec::new(),
            buf: String::new(),
            start: None,
            parens: 0,
            interp: 0,
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push_char(&mut self, c: char) {
        if self.start.is_none() && !c.is_whitespace() {
            self.start = Some((self.line, self.column));
        }
        self.buf.push(c);
    }

    fn emit(&mut self, kind: NodeKind, at: (usize, usize)) -> usize {
        self.nodes.push(Node {
            kind,
            line: at.0,
            column: at.1,
            parent: self.stack.last().copied(),
        });
        self.nodes.len() - 1
    }

    fn take_statement(&mut self) -> Option<(String, (usize, usize))> {
        let text = self.buf.trim().to_string();
        let at = self.start.take();
        self.buf.clear();
        match at {
            Some(at) if !text.is_empty() => Some((text, at)),
            _ => None,
        }
    }

    fn run(mut self) -> Vec<Node> {
        while let Some(c) = self.peek(0) {
            let next = self.peek(1);
            if c == '/' && next == Some('*') {
                self.block_comment();
                continue;
            }
            if c == '/' && next == Some('/') && self.parens == 0 && self.interp == 0 {
                self.line_comment();
                continue;
            }
            if c == '"' || c == '\'' {
                self.string(c);
                continue;
            }
            if c == '#' && next == Some('{') {
                self.interp += 1;
                self.push_char('#');
                self.push_char('{');
                self.bump();
                self.bump();
                continue;
            }
            match c {
                '(' => {
                    self.parens += 1;
                    self.push_char(c);
                }
                ')' => {
                    self.parens = self.parens.saturating_sub(1);
                    self.push_char(c);
                }
                '{' if self.interp == 0 && self.parens == 0 => self.open_block(),
                '}' if self.interp > 0 => {
                    self.interp -= 1;
                    self.push_char(c);
                }
                '}' => self.close_block(),
                ';' if self.parens == 0 && self.interp == 0 => self.flush_statement(),
                _ => self.push_char(c),
            }
            self.bump();
        }
        self.flush_statement();
        self.nodes
    }

    fn block_comment(&mut self) {
        let at = (self.line, self.column);
        self.bump();
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '*' && self.peek(1) == Some('/') {
                self.bump();
                self.bump();
                break;
            }
            text.push(c);
            self.bump();
        }
        self.emit(
            NodeKind::Comment {
                text: text.trim().to_string(),
                inline: false,
            },
            at,
        );
    }

    fn line_comment(&mut self) {
        let at = (self.line, self.column);
        self.bump();
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.emit(
            NodeKind::Comment {
                text: text.trim().to_string(),
                inline: true,
            },
            at,
        );
    }

    fn string(&mut self, quote: char) {
        self.push_char(quote);
        self.bump();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.push_char(c);
            self.bump();
            if c == '\\' {
                if let Some(escaped) = self.peek(0) {
                    self.push_char(escaped);
                    self.bump();
                }
                continue;
            }
            if c == quote {
                break;
            }
        }
    }

    fn open_block(&mut self) {
        let at = (self.line, self.column);
        let (text, at) = self.take_statement().unwrap_or((String::new(), at));
        let kind = match text.strip_prefix('@') {
            Some(rest) => {
                let (name, params) = split_at_rule(rest);
                NodeKind::AtRule {
                    name,
                    params,
                    has_block: true,
                }
            }
            None => NodeKind::Rule { selector: text },
        };
        let idx = self.emit(kind, at);
        self.stack.push(idx);
    }

    fn close_block(&mut self) {
        self.flush_statement();
        self.stack.pop();
    }

    fn flush_statement(&mut self) {
        let Some((text, at)) = self.take_statement() else {
            return;
        };
        if let Some(rest) = text.strip_prefix('@') {
            let (name, params) = split_at_rule(rest);
            self.emit(
                NodeKind::AtRule {
                    name,
                    params,
                    has_block: false,
                },
                at,
            );
        } else if let Some((property, value)) = text.split_once(':') {
            self.emit(
                NodeKind::Declaration {
                    property: property.trim().to_string(),
                    value: value.trim().to_string(),
                },
                at,
            );
        }
    }
}

/// Replace quoted strings and attribute-selector bodies with spaces so
/// token scans only see selector syntax. Byte offsets are kept.
pub fn blank_selector_literals(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut quote: Option<char> = None;
    let mut brackets = 0usize;
    for c in selector.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push_str(&" ".repeat(c.len_utf8()));
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(' ');
            }
            '[' => {
                brackets += 1;
                out.push(c);
            }
            ']' if brackets > 0 => {
                brackets -= 1;
                out.push(c);
            }
            _ if brackets > 0 => out.push_str(&" ".repeat(c.len_utf8())),
            _ => out.push(c),
        }
    }
    out
}

/// Names of pseudo-classes and pseudo-elements written with a single colon,
/// in source order.
pub fn single_colon_pseudos(selector: &str) -> Vec<String> {
    let masked = blank_selector_literals(selector);
    let chars: Vec<char> = masked.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != ':' {
            i += 1;
            continue;
        }
        if chars.get(i + 1) == Some(&':') {
            i += 2;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '-' || chars[j] == '_') {
            j += 1;
        }
        if j > i + 1 {
            found.push(chars[i + 1..j].iter().collect());
        }
        i = j.max(i + 1);
    }
    found
}

fn split_at_rule(rest: &str) -> (String, String) {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '(' || c == '{')
        .unwrap_or(rest.len());
    (rest[..end].to_string(), rest[end..].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sheet: &Stylesheet) -> Vec<&NodeKind> {
        sheet.nodes.iter().map(|n| &n.kind).collect()
    }

    #[test]
    fn test_scans_nested_rules_and_declarations() {
        let src = ".card {\n  display: flex;\n  .title { color: red }\n}\n";
        let sheet = Stylesheet::parse(src);
        assert_eq!(sheet.nodes.len(), 4);
        assert_eq!(
            sheet.nodes[0].kind,
            NodeKind::Rule {
                selector: ".card".into()
            }
        );
        assert_eq!(sheet.nodes[1].line, 2);
        assert_eq!(sheet.nodes[1].column, 3);
        assert_eq!(sheet.nodes[1].parent, Some(0));
        assert_eq!(sheet.nodes[2].parent, Some(0));
        assert_eq!(
            sheet.nodes[3].kind,
            NodeKind::Declaration {
                property: "color".into(),
                value: "red".into()
            }
        );
        assert_eq!(sheet.nodes[3].parent, Some(2));
        assert_eq!(sheet.enclosing_rule(3), Some(2));
    }

    #[test]
    fn test_handles_comments_strings_and_interpolation() {
        let src = "// note\n/* block */\n.a {\n  content: \"{;}\";\n  width: calc(#{$w} - 1px);\n  background: url(http://x.test/a.png);\n}\n";
        let sheet = Stylesheet::parse(src);
        let k = kinds(&sheet);
        assert!(matches!(k[0], NodeKind::Comment { inline: true, text } if text == "note"));
        assert!(matches!(k[1], NodeKind::Comment { inline: false, text } if text == "block"));
        assert!(matches!(k[3], NodeKind::Declaration { value, .. } if value == "\"{;}\""));
        assert!(matches!(k[4], NodeKind::Declaration { value, .. } if value == "calc(#{$w} - 1px)"));
        assert!(matches!(k[5], NodeKind::Declaration { value, .. } if value == "url(http://x.test/a.png)"));
        assert_eq!(sheet.nodes.len(), 6);
    }

    #[test]
    fn test_at_rules_with_and_without_blocks() {
        let src = "@use 'sass:math';\n.a {\n  @include breakpoint-up(md) {\n    gap: 0;\n  }\n}\n";
        let sheet = Stylesheet::parse(src);
        assert!(matches!(&sheet.nodes[0].kind, NodeKind::AtRule { name, has_block: false, .. } if name == "use"));
        assert!(matches!(
            &sheet.nodes[2].kind,
            NodeKind::AtRule { name, params, has_block: true } if name == "include" && params == "breakpoint-up(md)"
        ));
        assert_eq!(sheet.nodes[3].parent, Some(2));
        assert_eq!(sheet.enclosing_rule(3), Some(1));
    }

    #[test]
    fn test_vue_style_blocks_keep_file_line_numbers() {
        let src = "<template>\n  <div/>\n</template>\n<style lang=\"scss\" scoped>\n.box { color: red; }\n</style>\n";
        let sheet = Stylesheet::parse_for_path("src/App.vue", src);
        assert_eq!(sheet.nodes.len(), 2);
        assert_eq!(sheet.nodes[0].line, 5);
        assert_eq!(sheet.nodes[1].parent, Some(0));
    }

    #[test]
    fn test_blank_selector_literals_keeps_offsets() {
        let sel = r#"a[href$=".pdf"] .x, [data-y='a,b']"#;
        let masked = blank_selector_literals(sel);
        assert_eq!(masked.len(), sel.len());
        assert!(!masked.contains(".pdf"));
        assert!(masked.contains(" .x"));
        assert_eq!(masked.matches(',').count(), 1);
    }

    #[test]
    fn test_single_colon_pseudos() {
        assert_eq!(
            single_colon_pseudos("a:hover:focus-visible::after, .b:before"),
            vec!["hover", "focus-visible", "before"]
        );
        assert!(single_colon_pseudos(r#"[data-t="a:b"]"#).is_empty());
    }

    #[test]
    fn test_declaration_groups_by_block() {
        let sheet = Stylesheet::parse(".a { b: 1; c: 2; .d { e: 3 } }");
        let groups = sheet.declaration_groups();
        assert_eq!(groups.get(&Some(0)).map(Vec::len), Some(2));
        assert_eq!(groups.get(&Some(3)).map(Vec::len), Some(1));
    }
}
