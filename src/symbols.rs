//! C symbol → dotted name table.
//!
//! Walks one GIR document and maps every C-level identifier it declares
//! (`gtk_dialog_run`, `GTK_WINDOW_TOPLEVEL`, `GtkDialog`, …) to the name a
//! binding user sees (`Gtk.Dialog.run`, `Gtk.WindowType.TOPLEVEL`,
//! `Gtk.Dialog`). Renderers use it to turn C references in doc strings into
//! links.

use crate::error::{GirError, Result};
use crate::escape::{escape_dotted, escape_identifier};
use crate::reflection::Reflection;
use crate::tree::{GirDocument, Node};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Elements whose `c:identifier` is a callable entry point.
const CALLABLE_TAGS: &[&str] = &["function", "constructor", "method"];

/// Type declarations mapped only when they sit directly under `<namespace>`.
const TOP_LEVEL_TYPE_TAGS: &[&str] = &[
    "class",
    "interface",
    "enumeration",
    "bitfield",
    "callback",
    "union",
    "alias",
];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: BTreeMap<String, String>,
}

fn depth(name: &str) -> usize {
    name.matches('.').count()
}

impl SymbolTable {
    /// Map `c_name` to `dotted`, escaping each segment.
    ///
    /// An existing mapping is only replaced by one at the same or a smaller
    /// depth, so `Gtk.main` beats `Gtk.Foo.main` whatever the visit order.
    pub fn add(&mut self, c_name: &str, dotted: &str) -> Result<()> {
        if !dotted.contains('.') {
            return Err(GirError::UnqualifiedName {
                name: dotted.to_string(),
            });
        }
        if let Some(existing) = self.entries.get(c_name) {
            if depth(dotted) > depth(existing) {
                return Ok(());
            }
        }
        self.entries.insert(c_name.to_string(), escape_dotted(dotted));
        Ok(())
    }

    pub fn get(&self, c_name: &str) -> Option<&str> {
        self.entries.get(c_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn contains_value(&self, dotted: &str) -> bool {
        self.entries.values().any(|v| v == dotted)
    }

    /// Insert without the precedence rule or escaping.
    fn insert_raw(&mut self, c_name: String, dotted: String) {
        self.entries.insert(c_name, dotted);
    }
}

fn required_attr<'a>(node: Node<'a>, attribute: &'static str, context: &str) -> Result<&'a str> {
    node.attr(attribute).ok_or_else(|| GirError::MissingAttribute {
        tag: node.tag().unwrap_or_default().to_string(),
        attribute,
        context: context.to_string(),
    })
}

/// Prefix `local` with the names of all named ancestors, stopping at the
/// first unnamed one. `None` when the immediate parent is unnamed.
fn qualified_path<'a>(node: Node<'a>, local: &'a str) -> Option<Vec<&'a str>> {
    let mut segments = vec![local];
    for ancestor in node.ancestors() {
        match ancestor.attr("name") {
            Some(name) => segments.push(name),
            None => break,
        }
    }
    if segments.len() == 1 {
        return None;
    }
    segments.reverse();
    Some(segments)
}

fn is_top_level(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| p.is_tag("namespace"))
}

/// Build the symbol table for `namespace` from a parsed GIR document.
pub fn build_symbol_table(
    doc: &GirDocument,
    namespace: &str,
    reflection: &Reflection,
) -> Result<SymbolTable> {
    let mut table = SymbolTable::default();
    // escaped dotted name of a shadowed callable -> c:identifier replacing it
    let mut shadowed: BTreeMap<String, String> = BTreeMap::new();

    // gtk_main -> Gtk.main
    // gtk_dialog_get_response_for_widget -> Gtk.Dialog.get_response_for_widget
    for tag in CALLABLE_TAGS {
        for node in doc.descendants_by_tag(tag) {
            let local_name = node.attr("name").unwrap_or_default();
            let c_name = required_attr(node, "c:identifier", local_name)?;

            // anonymous wrappers, e.g. a nameless glib:boxed at top level
            let Some(mut segments) = qualified_path(node, local_name) else {
                continue;
            };

            if let Some(shadows) = node.attr("shadows") {
                if let Some(last) = segments.last_mut() {
                    *last = shadows;
                }
                let key = segments
                    .iter()
                    .map(|s| escape_identifier(s))
                    .collect::<Vec<_>>()
                    .join(".");
                shadowed.insert(key, c_name.to_string());
                if let Some(last) = segments.last_mut() {
                    *last = local_name;
                }
            }

            table.add(c_name, &segments.join("."))?;
        }
    }

    // GTK_SOME_FLAG_FOO -> Gtk.SomeFlag.FOO
    for node in doc.descendants_by_tag("member") {
        let member_name = node.attr("name").unwrap_or_default();
        let c_name = required_attr(node, "c:identifier", member_name)?;
        let type_name = node
            .parent()
            .and_then(|p| p.attr("name"))
            .unwrap_or_default();
        let dotted = format!("{namespace}.{type_name}.{}", member_name.to_uppercase());
        table.add(c_name, &dotted)?;
    }

    for tag in TOP_LEVEL_TYPE_TAGS {
        for node in doc.descendants_by_tag(tag) {
            if !is_top_level(node) {
                continue;
            }
            // e.g. GObject's _Value__data__union has neither
            let Some(c_name) = node.attr("c:type").or_else(|| node.attr("glib:type-name")) else {
                continue;
            };
            let type_name = node.attr("name").unwrap_or_default();
            table.add(c_name, &format!("{namespace}.{type_name}"))?;
        }
    }

    // cairo_t -> cairo.Context
    for node in doc.descendants_by_tag("record") {
        let Some(c_name) = node.attr("c:type") else {
            continue;
        };
        let type_name = node.attr("name").unwrap_or_default();
        table.add(c_name, &format!("{namespace}.{type_name}"))?;
    }

    // G_TIME_SPAN_MINUTE -> GLib.TIME_SPAN_MINUTE
    for node in doc.descendants_by_tag("constant") {
        if !is_top_level(node) {
            continue;
        }
        let Some(c_name) = node.attr("c:type") else {
            continue;
        };
        let name = node.attr("name").unwrap_or_default();
        table.add(c_name, &format!("{namespace}.{name}"))?;
    }

    resolve_shadows(&mut table, &shadowed)?;

    for (c_name, dotted) in reflection.synthetic_symbols(namespace) {
        table.insert_raw(c_name, dotted);
    }

    debug!(
        namespace,
        symbols = table.len(),
        shadows = shadowed.len(),
        "built symbol table"
    );
    Ok(table)
}

/// Point each replacing callable's C name at the name it shadows, so that
/// `gdk_threads_add_timeout_full` resolves to `Gdk.threads_add_timeout`.
fn resolve_shadows(table: &mut SymbolTable, shadowed: &BTreeMap<String, String>) -> Result<()> {
    if let Some(missing) = shadowed.keys().find(|name| !table.contains_value(name)) {
        return Err(GirError::UnresolvedShadow {
            name: missing.clone(),
        });
    }

    let redirects: Vec<(String, String)> = table
        .iter()
        .filter_map(|(_, dotted)| {
            shadowed
                .get(dotted)
                .map(|replacement| (replacement.clone(), dotted.to_string()))
        })
        .collect();
    for (c_name, dotted) in redirects {
        table.insert_raw(c_name, dotted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::GOBJECT;

    fn build(xml: &str, namespace: &str) -> Result<SymbolTable> {
        let doc = GirDocument::parse(xml).unwrap();
        build_symbol_table(&doc, namespace, &Reflection::empty())
    }

    fn gir(body: &str) -> String {
        format!(
            r#"<repository version="1.2"><namespace name="Gtk" version="3.0">{body}</namespace></repository>"#
        )
    }

    #[test]
    fn functions_and_methods() {
        let table = build(
            &gir(r#"
            <function name="main" c:identifier="gtk_main"/>
            <class name="Dialog" c:type="GtkDialog">
              <constructor name="new" c:identifier="gtk_dialog_new"/>
              <method name="get_response_for_widget" c:identifier="gtk_dialog_get_response_for_widget"/>
            </class>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("gtk_main"), Some("Gtk.main"));
        assert_eq!(table.get("gtk_dialog_new"), Some("Gtk.Dialog.new"));
        assert_eq!(
            table.get("gtk_dialog_get_response_for_widget"),
            Some("Gtk.Dialog.get_response_for_widget")
        );
        assert_eq!(table.get("GtkDialog"), Some("Gtk.Dialog"));
    }

    #[test]
    fn shallower_name_wins_in_either_order() {
        let deep_first = gir(r#"
            <class name="Foo" c:type="GtkFoo">
              <function name="main" c:identifier="gtk_main"/>
            </class>
            <function name="main" c:identifier="gtk_main"/>"#);
        let shallow_first = gir(r#"
            <function name="main" c:identifier="gtk_main"/>
            <class name="Foo" c:type="GtkFoo">
              <function name="main" c:identifier="gtk_main"/>
            </class>"#);
        assert_eq!(build(&deep_first, "Gtk").unwrap().get("gtk_main"), Some("Gtk.main"));
        assert_eq!(build(&shallow_first, "Gtk").unwrap().get("gtk_main"), Some("Gtk.main"));
    }

    #[test]
    fn add_rejects_unqualified_names() {
        let mut table = SymbolTable::default();
        let err = table.add("gtk_main", "main").unwrap_err();
        assert!(matches!(err, GirError::UnqualifiedName { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn add_equal_depth_replaces() {
        let mut table = SymbolTable::default();
        table.add("x", "Gtk.a").unwrap();
        table.add("x", "Gtk.b").unwrap();
        assert_eq!(table.get("x"), Some("Gtk.b"));
        table.add("x", "Gtk.C.d").unwrap();
        assert_eq!(table.get("x"), Some("Gtk.b"));
    }

    #[test]
    fn reserved_segments_are_escaped() {
        let table = build(
            &gir(r#"<class name="Widget" c:type="GtkWidget">
                <method name="print" c:identifier="gtk_widget_print"/>
            </class>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("gtk_widget_print"), Some("Gtk.Widget.print_"));
    }

    #[test]
    fn callable_without_c_identifier_is_fatal() {
        let err = build(&gir(r#"<function name="main"/>"#), "Gtk").unwrap_err();
        assert!(matches!(
            err,
            GirError::MissingAttribute { attribute: "c:identifier", .. }
        ));
    }

    #[test]
    fn callable_in_unnamed_wrapper_is_skipped() {
        let table = build(
            &gir(r#"<glib:boxed glib:type-name="FsThing">
                <function name="get_type" c:identifier="fs_thing_get_type"/>
            </glib:boxed>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("fs_thing_get_type"), None);
    }

    #[test]
    fn shadowing_redirects_replacement_to_shadowed_name() {
        let table = build(
            &gir(r#"
            <function name="threads_add_timeout" c:identifier="gdk_threads_add_timeout"
                      introspectable="0"/>
            <function name="threads_add_timeout_full" c:identifier="gdk_threads_add_timeout_full"
                      shadows="threads_add_timeout"/>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("gdk_threads_add_timeout"), Some("Gtk.threads_add_timeout"));
        assert_eq!(
            table.get("gdk_threads_add_timeout_full"),
            Some("Gtk.threads_add_timeout")
        );
    }

    #[test]
    fn shadowing_inside_a_class() {
        let table = build(
            &gir(r#"<class name="Widget" c:type="GtkWidget">
                <method name="class" c:identifier="gtk_widget_class"/>
                <method name="class_full" c:identifier="gtk_widget_class_full" shadows="class"/>
            </class>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("gtk_widget_class_full"), Some("Gtk.Widget.class_"));
    }

    #[test]
    fn unresolved_shadow_is_fatal() {
        let err = build(
            &gir(r#"<function name="a_full" c:identifier="gtk_a_full" shadows="a"/>"#),
            "Gtk",
        )
        .unwrap_err();
        match err {
            GirError::UnresolvedShadow { name } => assert_eq!(name, "Gtk.a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enum_members_are_uppercased() {
        let table = build(
            &gir(r#"<bitfield name="SomeFlag" c:type="GtkSomeFlag">
                <member name="foo-bar" value="1" c:identifier="GTK_SOME_FLAG_FOO_BAR"/>
                <member name="baz" value="2" c:identifier="GTK_SOME_FLAG_BAZ"/>
            </bitfield>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("GTK_SOME_FLAG_FOO_BAR"), Some("Gtk.SomeFlag.FOO-BAR"));
        assert_eq!(table.get("GTK_SOME_FLAG_BAZ"), Some("Gtk.SomeFlag.BAZ"));
        assert_eq!(table.get("GtkSomeFlag"), Some("Gtk.SomeFlag"));
    }

    #[test]
    fn member_without_c_identifier_is_fatal() {
        let err = build(
            &gir(r#"<enumeration name="E" c:type="GtkE"><member name="a" value="0"/></enumeration>"#),
            "Gtk",
        )
        .unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn types_fall_back_to_glib_type_name() {
        let table = build(
            &gir(r#"
            <class name="Settings" glib:type-name="GtkSettings"/>
            <union name="_Value__data__union"/>
            <alias name="Allocation" c:type="GtkAllocation"/>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("GtkSettings"), Some("Gtk.Settings"));
        assert_eq!(table.get("GtkAllocation"), Some("Gtk.Allocation"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn nested_types_and_constants_are_skipped() {
        let table = build(
            &gir(r#"
            <constant name="MAJOR_VERSION" value="3" c:type="GTK_MAJOR_VERSION"/>
            <record name="Outer" c:type="GtkOuter">
              <union name="Inner" c:type="GtkInner"/>
              <constant name="NESTED" value="1" c:type="GTK_NESTED"/>
            </record>
            <record name="HazardPointer"/>"#),
            "Gtk",
        )
        .unwrap();
        assert_eq!(table.get("GTK_MAJOR_VERSION"), Some("Gtk.MAJOR_VERSION"));
        assert_eq!(table.get("GtkOuter"), Some("Gtk.Outer"));
        assert_eq!(table.get("GtkInner"), None);
        assert_eq!(table.get("GTK_NESTED"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn gobject_gets_synthetic_entries() {
        let doc = GirDocument::parse(
            r#"<repository><namespace name="GObject"><class name="Object" c:type="GObject"/></namespace></repository>"#,
        )
        .unwrap();
        let reflection = Reflection::empty().with_namespace(GOBJECT, ["TYPE_INT"]);
        let table = build_symbol_table(&doc, GOBJECT, &reflection).unwrap();
        assert_eq!(table.get("G_TYPE_INT"), Some("GObject.TYPE_INT"));
        assert_eq!(table.get("GBoxed"), Some("GObject.GBoxed"));
        assert_eq!(table.get("GObject"), Some("GObject.Object"));
    }

    #[test]
    fn every_value_is_qualified() {
        let table = build(
            &gir(r#"<function name="main" c:identifier="gtk_main"/>
                <enumeration name="E" c:type="GtkE"><member name="a" c:identifier="GTK_E_A"/></enumeration>"#),
            "Gtk",
        )
        .unwrap();
        assert!(table.iter().all(|(_, v)| v.contains('.')));
    }

    #[test]
    fn building_twice_is_identical() {
        let xml = gir(r#"<function name="main" c:identifier="gtk_main"/>
            <class name="A" c:type="GtkA"><method name="b" c:identifier="gtk_a_b"/></class>"#);
        let doc = GirDocument::parse(&xml).unwrap();
        let first = build_symbol_table(&doc, "Gtk", &Reflection::empty()).unwrap();
        let second = build_symbol_table(&doc, "Gtk", &Reflection::empty()).unwrap();
        assert_eq!(first, second);
    }
}
