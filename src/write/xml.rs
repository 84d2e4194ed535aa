//! A small XML element tree and its writer.

use std::fmt::{Display, Write};

pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Element {
        Element {
            name,
            attrs: vec![],
            text: None,
            children: vec![],
        }
    }

    pub fn attr<V: Display>(mut self, name: &'static str, value: V) -> Element {
        self.attrs.push((name, value.to_string()));
        self
    }

    pub fn text<V: Display>(mut self, text: V) -> Element {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|&&(n, _)| n == name)
            .map(|&(_, ref v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Formats with 6 decimals. Negative zero is written as zero.
pub fn f6(x: f64) -> String {
    let s = format!("{:.6}", x);
    if s == "-0.000000" { "0.000000".to_string() } else { s }
}

/// Space-separated list.
pub fn join<T: Display, I: IntoIterator<Item=T>>(it: I) -> String {
    let mut s = String::new();
    for (i, x) in it.into_iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        write!(s, "{}", x).ok();
    }
    s
}

pub fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

pub struct Xml {
    s: String,
    cur_indent: u32,
    pretty: bool,
}

static INDENT_SIZE: u32 = 2;

impl Xml {
    pub fn with_capacity(capacity: usize, pretty: bool) -> Xml {
        Xml {
            s: String::with_capacity(capacity),
            cur_indent: 0,
            pretty,
        }
    }

    pub fn string(self) -> String {
        self.s
    }

    fn nl(&mut self) {
        if !self.pretty {
            return;
        }
        self.s.push('\n');
        for _ in 0..self.cur_indent * INDENT_SIZE {
            self.s.push(' ');
        }
    }

    fn push_escaped(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.s.push_str("&amp;"),
                '<' => self.s.push_str("&lt;"),
                '>' => self.s.push_str("&gt;"),
                '"' => self.s.push_str("&quot;"),
                c => self.s.push(c),
            }
        }
    }

    pub fn declaration(&mut self) {
        self.s.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    }

    pub fn element(&mut self, e: &Element) {
        self.nl();
        self.s.push('<');
        self.s.push_str(e.name);
        for &(name, ref value) in &e.attrs {
            self.s.push(' ');
            self.s.push_str(name);
            self.s.push_str("=\"");
            self.push_escaped(value);
            self.s.push('"');
        }

        if e.children.is_empty() && e.text.is_none() {
            self.s.push_str("/>");
            return;
        }
        self.s.push('>');

        if let Some(ref text) = e.text {
            self.push_escaped(text);
        }
        if !e.children.is_empty() {
            self.cur_indent += 1;
            for child in &e.children {
                self.element(child);
            }
            self.cur_indent -= 1;
            self.nl();
        }

        self.s.push_str("</");
        self.s.push_str(e.name);
        self.s.push('>');
    }
}

/// The whole document, indented when `pretty`, else on one line.
pub fn write_document(root: &Element, pretty: bool) -> String {
    let mut xml = Xml::with_capacity(64 * 1024, pretty);
    xml.declaration();
    xml.element(root);
    let mut s = xml.string();
    if pretty {
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    fn doc() -> Element {
        Element::new("imd").attr("version", "1.6.0")
            .child(Element::new("head")
                .child(Element::new("title").text("a <b> & \"c\"")))
            .child(Element::new("empty").attr("n", 3))
    }

    #[test]
    fn compact() {
        assert_eq!(
            write_document(&doc(), false),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <imd version=\"1.6.0\"><head><title>a &lt;b&gt; &amp; &quot;c&quot;</title>\
             </head><empty n=\"3\"/></imd>"
        );
    }

    #[test]
    fn pretty() {
        assert_eq!(
            write_document(&doc(), true),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <imd version=\"1.6.0\">\n\
             \x20 <head>\n\
             \x20   <title>a &lt;b&gt; &amp; &quot;c&quot;</title>\n\
             \x20 </head>\n\
             \x20 <empty n=\"3\"/>\n\
             </imd>\n"
        );
    }

    #[test]
    fn number_formatting() {
        assert_eq!(f6(1.0), "1.000000");
        assert_eq!(f6(-0.0), "0.000000");
        assert_eq!(f6(-0.0000001), "0.000000");
        assert_eq!(f6(-2.5), "-2.500000");
        assert_eq!(join(&[1, 2, 3]), "1 2 3");
        assert_eq!(join(Vec::<u32>::new()), "");
    }
}
