//! CSS selectors over the document arena, backed by Servo's `selectors` crate.
//!
//! [`ArenaElement`] adapts an arena node to `selectors::Element`, so matching
//! always sees the live class list, attributes and form state. Beyond the
//! standard syntax the only non-structural pseudo-classes are `:checked` and
//! `:disabled`.

use cssparser::{
    CowRcStr, CssStringWriter, ParseError, Parser as CssParser, ParserInput, SourceLocation, ToCss,
    serialize_identifier,
};
use selectors::NthIndexCache;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::QuirksMode;
use selectors::matching::{
    ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, matches_selector_list,
};
use selectors::parser::{
    ParseRelative, Parser as SelParser, SelectorImpl, SelectorList, SelectorParseErrorKind,
};
use selectors::{Element as ServoElement, OpaqueElement};

use crate::document::{Document, Element, NodeId};
use crate::error::DomError;

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone)]
pub struct Selector {
    list: SelectorList<SimpleImpl>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let mut parser_input = ParserInput::new(input);
        let mut parser = CssParser::new(&mut parser_input);
        SelectorList::parse(&ArenaParser, &mut parser, ParseRelative::No)
            .map(|list| Self { list })
            .map_err(|err| DomError::selector(input, format!("{:?}", err.kind)))
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = ArenaElement::new(doc, id) else {
            return false;
        };
        let mut cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        matches_selector_list(&self.list, &element, &mut context)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CssIdent(pub String);

impl AsRef<str> for CssIdent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CssIdent {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for CssIdent {
    fn from(s: &'a str) -> Self {
        Self(s.to_owned())
    }
}

impl ToCss for CssIdent {
    fn to_css<W>(&self, dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        serialize_identifier(&self.0, dest)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CssAttrValue(pub String);

impl AsRef<str> for CssAttrValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for CssAttrValue {
    fn from(s: &'a str) -> Self {
        Self(s.to_owned())
    }
}

impl ToCss for CssAttrValue {
    fn to_css<W>(&self, dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        use std::fmt::Write;
        write!(CssStringWriter::new(dest), "{}", &self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleImpl {}

impl SelectorImpl for SimpleImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssAttrValue;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespaceUrl = CssIdent;
    type NamespacePrefix = CssIdent;
    type BorrowedNamespaceUrl = str;
    type BorrowedLocalName = str;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = NoPseudoElement;
}

/// Form-state pseudo-classes read from the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Checked,
    Disabled,
}

impl ToCss for PseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        dest.write_str(match self {
            PseudoClass::Checked => ":checked",
            PseudoClass::Disabled => ":disabled",
        })
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = SimpleImpl;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoPseudoElement {}

impl ToCss for NoPseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        Ok(())
    }
}

impl selectors::parser::PseudoElement for NoPseudoElement {
    type Impl = SimpleImpl;
}

struct ArenaParser;

impl<'i> SelParser<'i> for ArenaParser {
    type Impl = SimpleImpl;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<PseudoClass, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("checked") {
            Ok(PseudoClass::Checked)
        } else if name.eq_ignore_ascii_case("disabled") {
            Ok(PseudoClass::Disabled)
        } else {
            Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            ))
        }
    }
}

/// One arena node seen through `selectors::Element`.
#[derive(Clone, Debug)]
pub struct ArenaElement<'a> {
    doc: &'a Document,
    id: NodeId,
    el: &'a Element,
}

impl<'a> ArenaElement<'a> {
    pub fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        doc.element(id).map(|el| Self { doc, id, el })
    }

    fn siblings(&self) -> &'a [NodeId] {
        match self.el.parent() {
            Some(parent) => self.doc.children(parent),
            None => &[],
        }
    }

    fn sibling_at(&self, offset: isize) -> Option<Self> {
        let siblings = self.siblings();
        let index = siblings.iter().position(|node| *node == self.id)?;
        let target = index.checked_add_signed(offset)?;
        siblings
            .get(target)
            .and_then(|node| Self::new(self.doc, *node))
    }
}

fn eq_case(a: &str, b: &str, case: CaseSensitivity) -> bool {
    match case {
        CaseSensitivity::CaseSensitive => a == b,
        CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
    }
}

impl<'a> ServoElement for ArenaElement<'a> {
    type Impl = SimpleImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.el)
    }

    fn parent_element(&self) -> Option<Self> {
        self.el
            .parent()
            .and_then(|parent| Self::new(self.doc, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_at(-1)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_at(1)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.el
            .children()
            .first()
            .and_then(|child| Self::new(self.doc, *child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &str) -> bool {
        self.el.tag.eq_ignore_ascii_case(name)
    }

    fn has_namespace(&self, _ns: &str) -> bool {
        true
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.el.tag.eq_ignore_ascii_case(&other.el.tag)
    }

    fn attr_matches(
        &self,
        _ns: &NamespaceConstraint<&CssIdent>,
        local_name: &CssIdent,
        operation: &AttrSelectorOperation<&CssAttrValue>,
    ) -> bool {
        // The class list is authoritative once mutations have run.
        if local_name.0.eq_ignore_ascii_case("class") {
            let classes: Vec<&str> = self.el.classes().collect();
            return !classes.is_empty() && operation.eval_str(&classes.join(" "));
        }
        self.el
            .attr(local_name.as_ref())
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match pc {
            PseudoClass::Checked => self.el.is_checked(),
            PseudoClass::Disabled => self.el.is_disabled(),
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &NoPseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.el.tag.as_str(), "a" | "area") && self.el.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssIdent, case: CaseSensitivity) -> bool {
        self.el.id().is_some_and(|value| eq_case(value, id.as_ref(), case))
    }

    fn has_class(&self, name: &CssIdent, case: CaseSensitivity) -> bool {
        self.el
            .classes()
            .any(|class| eq_case(class, name.as_ref(), case))
    }

    fn imported_part(&self, _name: &CssIdent) -> Option<CssIdent> {
        None
    }

    fn is_part(&self, _name: &CssIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.el.children().is_empty() && self.el.text().is_empty()
    }

    fn is_root(&self) -> bool {
        self.el.parent().is_none()
    }
}
