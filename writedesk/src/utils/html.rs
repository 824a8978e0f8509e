//! Small markup builders used by the region producers.
//!
//! Attribute values and text content are escaped here; callers pass raw
//! strings. `inner` arguments are trusted markup.

use super::text::escape_html;
use std::fmt::Write as _;

/// Wraps trusted markup in an element with optional attributes.
#[must_use]
pub fn tag(name: &str, inner: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(inner.len() + 32);
    let _ = write!(out, "<{name}");
    push_attrs(&mut out, attrs);
    let _ = write!(out, ">{inner}</{name}>");
    out
}

fn push_attrs(out: &mut String, attrs: &[(&str, &str)]) {
    for (key, value) in attrs {
        let _ = write!(out, " {key}=\"{}\"", escape_html(value));
    }
}

/// Builds a void element such as `<input>`.
#[must_use]
pub fn void_tag(name: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = format!("<{name}");
    push_attrs(&mut out, attrs);
    out.push_str(" />");
    out
}

/// A paragraph with a class.
#[must_use]
pub fn graf(inner: &str, class: &str) -> String {
    if class.is_empty() {
        tag("p", inner, &[])
    } else {
        tag("p", inner, &[("class", class)])
    }
}

/// An escaped label for a control.
#[must_use]
pub fn label(text: &str, for_id: &str) -> String {
    tag("label", &escape_html(text), &[("for", for_id)])
}

/// A hidden input.
#[must_use]
pub fn hidden_input(name: &str, value: &str) -> String {
    void_tag("input", &[("type", "hidden"), ("name", name), ("value", value)])
}

/// A single-line text input.
#[must_use]
pub fn text_input(name: &str, value: &str, id: &str) -> String {
    void_tag(
        "input",
        &[("type", "text"), ("name", name), ("id", id), ("value", value)],
    )
}

/// A multi-line text area.
#[must_use]
pub fn textarea(name: &str, value: &str, id: &str) -> String {
    tag("textarea", &escape_html(value), &[("name", name), ("id", id)])
}

/// A select box. The option whose value equals `selected` is preselected;
/// `blank_first` prepends an empty option.
#[must_use]
pub fn select(
    name: &str,
    options: &[(String, String)],
    selected: &str,
    blank_first: bool,
    id: &str,
) -> String {
    let mut inner = String::new();
    if blank_first {
        inner.push_str(&tag("option", "", &[("value", "")]));
    }
    for (value, title) in options {
        let body = escape_html(title);
        if value == selected {
            inner.push_str(&tag(
                "option",
                &body,
                &[("value", value), ("selected", "selected")],
            ));
        } else {
            inner.push_str(&tag("option", &body, &[("value", value)]));
        }
    }
    tag("select", &inner, &[("name", name), ("id", id)])
}

/// A radio button.
#[must_use]
pub fn radio(name: &str, value: &str, checked: bool, id: &str) -> String {
    let mut attrs = vec![("type", "radio"), ("name", name), ("value", value), ("id", id)];
    if checked {
        attrs.push(("checked", "checked"));
    }
    void_tag("input", &attrs)
}

/// A checkbox with value `1`.
#[must_use]
pub fn checkbox(name: &str, checked: bool, id: &str) -> String {
    let mut attrs = vec![("type", "checkbox"), ("name", name), ("value", "1"), ("id", id)];
    if checked {
        attrs.push(("checked", "checked"));
    }
    void_tag("input", &attrs)
}

/// A link.
#[must_use]
pub fn href(text: &str, url: &str) -> String {
    tag("a", &escape_html(text), &[("href", url)])
}
