//! Locating the stock container in a page
//!
//! The page's class names are not stable, so the container holding the
//! category sections is found by trying an ordered cascade of structural
//! hypotheses, strictest first. A hypothesis only counts as matching when the
//! element it picks actually holds a section heading.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Class list of the container in the page's expected layout
const EXPECTED_CONTAINER_CLASSES: &str =
    "grid grid-cols-1 md:grid-cols-3 gap-6 px-6 text-left max-w-screen-lg mx-auto";

static DIV: Lazy<Selector> = Lazy::new(|| parse_selector("div"));
static GRID_CLASS: Lazy<Selector> = Lazy::new(|| parse_selector("div.grid"));
static GRID_LIKE_CLASS: Lazy<Selector> = Lazy::new(|| parse_selector(r#"div[class*="grid"]"#));
static MAIN: Lazy<Selector> = Lazy::new(|| parse_selector("main"));
static SECTION: Lazy<Selector> = Lazy::new(|| parse_selector("section"));

/// Heading element that labels a category section
pub(crate) static HEADING: Lazy<Selector> = Lazy::new(|| parse_selector("h2"));

pub(crate) fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// One structural guess about where the category sections live
pub struct ContainerHypothesis {
    /// Short name used in logs
    pub name: &'static str,
    find: for<'a> fn(&'a Html) -> Option<ElementRef<'a>>,
}

impl ContainerHypothesis {
    /// Applies this hypothesis to a document
    pub fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        (self.find)(document)
    }
}

/// Hypotheses in the order they are tried
pub const CONTAINER_CASCADE: &[ContainerHypothesis] = &[
    ContainerHypothesis {
        name: "expected-grid",
        find: find_expected_grid,
    },
    ContainerHypothesis {
        name: "grid-class",
        find: find_grid_class,
    },
    ContainerHypothesis {
        name: "grid-like-class",
        find: find_grid_like_class,
    },
    ContainerHypothesis {
        name: "main",
        find: find_main,
    },
    ContainerHypothesis {
        name: "section",
        find: find_section,
    },
];

/// The container picked for a page, and the hypothesis that found it
#[derive(Debug, Clone, Copy)]
pub struct LocatedContainer<'a> {
    pub hypothesis: &'static str,
    pub element: ElementRef<'a>,
}

/// Finds the container holding all category sections
///
/// Returns None when every hypothesis in [`CONTAINER_CASCADE`] fails.
pub fn locate_container(document: &Html) -> Option<LocatedContainer<'_>> {
    CONTAINER_CASCADE.iter().find_map(|hypothesis| {
        let element = hypothesis.find(document)?;
        tracing::debug!("Container found by hypothesis '{}'", hypothesis.name);
        Some(LocatedContainer {
            hypothesis: hypothesis.name,
            element,
        })
    })
}

/// Lists the category sections inside a container
///
/// A section is the outermost `div` holding exactly one heading. Wrappers
/// around several sections are looked through, and inner divs of an accepted
/// section are not reported again.
pub fn find_sections<'a>(container: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut sections: Vec<ElementRef<'a>> = Vec::new();

    for candidate in container.select(&DIV) {
        let inside_accepted = candidate
            .ancestors()
            .any(|ancestor| sections.iter().any(|s| s.id() == ancestor.id()));
        if inside_accepted {
            continue;
        }

        if heading_count(candidate) == 1 {
            sections.push(candidate);
        }
    }

    sections
}

fn heading_count(element: ElementRef<'_>) -> usize {
    element.select(&HEADING).count()
}

fn has_heading(element: &ElementRef<'_>) -> bool {
    element.select(&HEADING).next().is_some()
}

fn first_with_heading<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).find(has_heading)
}

fn find_expected_grid(document: &Html) -> Option<ElementRef<'_>> {
    let expected: Vec<&str> = EXPECTED_CONTAINER_CLASSES.split_whitespace().collect();
    document
        .select(&DIV)
        .filter(|div| {
            div.value()
                .attr("class")
                .map(|class| class.split_whitespace().eq(expected.iter().copied()))
                .unwrap_or(false)
        })
        .find(has_heading)
}

fn find_grid_class(document: &Html) -> Option<ElementRef<'_>> {
    first_with_heading(document, &GRID_CLASS)
}

fn find_grid_like_class(document: &Html) -> Option<ElementRef<'_>> {
    first_with_heading(document, &GRID_LIKE_CLASS)
}

fn find_main(document: &Html) -> Option<ElementRef<'_>> {
    first_with_heading(document, &MAIN)
}

fn find_section(document: &Html) -> Option<ElementRef<'_>> {
    first_with_heading(document, &SECTION)
}
