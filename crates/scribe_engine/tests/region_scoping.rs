use chrono::Utc;
use pretty_assertions::assert_eq;
use scribe_engine::{
    find_anchor, scope_region, Document, MarkdownRenderer, PageExtractor, Region, RegionKind,
    SourceLocator,
};

fn region(markup: &str, anchor: &str) -> Region {
    let doc = Document::parse(markup);
    let element = find_anchor(&doc, anchor).expect("anchor present");
    scope_region(element)
}

fn rendered(markup: &str, anchor: &str) -> String {
    MarkdownRenderer::new().render(region(markup, anchor).fragment())
}

#[test]
fn heading_section_stops_at_sibling_of_same_level() {
    let md = rendered(
        r#"<main>
            <h2 id="install">Install</h2>
            <p>Run the installer.</p>
            <ul><li>step</li></ul>
            <h2 id="usage">Usage</h2>
            <p>Use it.</p>
        </main>"#,
        "install",
    );
    assert_eq!(md, "## Install\n\nRun the installer.\n\n* step\n");
}

#[test]
fn deeper_headings_stay_until_shallower_heading_closes() {
    let region = region(
        r#"<body>
            <h2 id="a">A</h2>
            <p>one</p>
            <h3>A.1</h3>
            <p>two</p>
            <h1>Chapter</h1>
            <p>after</p>
        </body>"#,
        "a",
    );
    assert_eq!(region.kind(), RegionKind::Section { level: 2 });
    let md = MarkdownRenderer::new().render(region.fragment());
    assert_eq!(md, "## A\n\none\n\n### A.1\n\ntwo\n");
}

#[test]
fn non_heading_anchor_is_its_whole_subtree() {
    let region = region(
        r#"<h2>Before</h2>
           <div id="box"><h2>Inside</h2><p>x</p><h1>Also inside</h1></div>
           <p>sibling</p>"#,
        "box",
    );
    assert_eq!(region.kind(), RegionKind::Subtree);
    assert_eq!(region.fragment().text(), "InsidexAlso inside");
}

#[test]
fn wrapper_with_nested_stop_heading_is_truncated_and_ends_the_walk() {
    let md = rendered(
        r#"<div>
            <h2 id="s">Section</h2>
            <p>lead</p>
            <div class="wrap">
                <p>kept</p>
                <section><p>kept too</p><h2>Stop</h2><p>dropped</p></section>
                <p>after the section</p>
            </div>
            <p>never reached</p>
        </div>"#,
        "s",
    );
    assert_eq!(
        md,
        "## Section\n\nlead\n\nkept\n\nkept too\n\nafter the section\n"
    );
}

#[test]
fn truncation_keeps_content_after_the_stop_heading_parent() {
    let region = region(
        r#"<div><h2 id="s">S</h2><div class="wrap"><section><p>kept</p><h2>Stop</h2><p>dropped</p></section><p>after-section</p></div></div>"#,
        "s",
    );
    assert_eq!(region.fragment().text(), "Skeptafter-section");
}

#[test]
fn nested_deeper_heading_does_not_truncate() {
    let md = rendered(
        r#"<h2 id="s">S</h2><div><h3>Sub</h3><p>body</p></div><h2>T</h2>"#,
        "s",
    );
    assert_eq!(md, "## S\n\n### Sub\n\nbody\n");
}

#[test]
fn section_captures_to_end_of_container_when_nothing_closes_it() {
    let md = rendered(
        r#"<article>
            <section><h3 id="last">Last</h3><p>tail one</p><p>tail two</p></section>
            <h1>Outside the container</h1>
        </article>"#,
        "last",
    );
    assert_eq!(md, "### Last\n\ntail one\n\ntail two\n");
}

#[test]
fn heading_without_siblings_is_just_the_heading() {
    let md = rendered(r#"<div><h4 id="lonely">Alone</h4></div><p>elsewhere</p>"#, "lonely");
    assert_eq!(md, "#### Alone\n");
}

#[test]
fn scoping_is_idempotent_and_leaves_source_untouched() {
    let markup = r#"<h2 id="a">A</h2><p>x</p><div><p>y</p><h2>B</h2><p>z</p></div>"#;
    let doc = Document::parse(markup);
    let before = doc.html().html();

    let first = scope_region(find_anchor(&doc, "a").unwrap());
    let second = scope_region(find_anchor(&doc, "a").unwrap());
    assert_eq!(first, second);
    assert_eq!(doc.html().html(), before);

    let copy = Document::parse(&before);
    let third = scope_region(find_anchor(&copy, "a").unwrap());
    let renderer = MarkdownRenderer::new();
    assert_eq!(
        renderer.render(first.fragment()),
        renderer.render(third.fragment())
    );
}

#[test]
fn missing_anchor_falls_back_to_content_container() {
    let markup = r#"<html><head><title>Page</title></head><body>
        <div class="sidebar"><p>menu</p></div>
        <article><h1>Article</h1><p>text</p></article>
    </body></html>"#;
    let locator = SourceLocator::parse("https://example.com/p#missing").unwrap();
    let record = PageExtractor::default().extract(markup, &locator, Utc::now());

    assert_eq!(record.title, "Page (Section: Article)");
    assert_eq!(record.body, "# Article\n\ntext\n");
}

#[test]
fn missing_anchor_with_headingless_fallback_names_the_anchor() {
    let markup = r#"<html><head><title>Page</title></head><body>
        <main><p>no headings here</p></main>
    </body></html>"#;
    let locator = SourceLocator::parse("https://example.com/p#gone").unwrap();
    let record = PageExtractor::default().extract(markup, &locator, Utc::now());

    assert_eq!(record.title, "Page (Section: #gone)");
}
