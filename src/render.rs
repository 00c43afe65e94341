//! HTML rendering.
//!
//! Pages are produced with [maud](https://maud.lambda.xyz/) from typed view
//! structs. [`Templates`] is built once per build with everything shared by
//! every page (site title, top-level navigation, stylesheet link) and is
//! passed by reference to the walker.
//!
//! ## Generated Pages
//!
//! - **Gallery page** (`<collection>/index.html`): tile grid linking to detail pages
//! - **Cover page** (`<collection>/index.html` when it has sub-collections):
//!   one tile per child collection, then the collection's own items unlinked
//! - **Detail page** (`<collection>/<slug>.html`): one image with EXIF caption
//!   and wrapping prev/next links
//! - **About page** (`about/index.html`): markdown body from config
//!
//! Links inside a collection are relative; navigation and the stylesheet are
//! root-absolute so every page works at any depth.

use crate::imaging::DerivedVariant;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS_STATIC: &str = include_str!("../static/filmstrip.css");

/// Site-relative location of the generated stylesheet.
pub const STYLESHEET_PATH: &str = "css/filmstrip.css";

const GALLERY_SIZES: &str = "(max-width: 800px) 50vw, 25vw";
const DETAIL_SIZES: &str = "(max-width: 800px) 100vw, 80vw";

/// One entry of the top-level navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    /// Output directory name under the site root; `about` for the about page.
    pub slug: String,
}

impl NavLink {
    fn href(&self) -> String {
        format!("/{}/index.html", self.slug)
    }
}

/// A responsive image reference, relative to the page that shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub srcset: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    /// Build from an item's variants. `prefix` is the directory of the
    /// variants relative to the page (empty, or `child/` with trailing slash).
    ///
    /// The middle variant is the fallback `src`; `None` when there are no
    /// variants to show.
    pub fn from_variants(prefix: &str, variants: &[DerivedVariant], alt: &str) -> Option<Self> {
        let original = variants.first()?;
        let fallback = &variants[variants.len() / 2];
        let srcset = variants
            .iter()
            .map(|v| format!("{}{} {}", prefix, v.filename, v.descriptor))
            .collect::<Vec<_>>()
            .join(", ");
        Some(Self {
            src: format!("{}{}", prefix, fallback.filename),
            srcset,
            alt: alt.to_string(),
            width: original.width,
            height: original.height,
        })
    }
}

/// One tile of a gallery or cover page.
#[derive(Debug, Clone)]
pub struct Tile {
    pub title: String,
    /// Link target relative to the page; unlinked tiles have none.
    pub href: Option<String>,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    /// Leaf collection: its items.
    Gallery,
    /// Collection with children: child tiles first, then its own items.
    Cover,
}

pub struct GalleryView<'a> {
    pub title: &'a str,
    pub kind: GalleryKind,
    /// Top-level navigation slug this page belongs to; empty for the root.
    pub section: &'a str,
    pub tiles: &'a [Tile],
}

/// Link to a neighbouring detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub title: String,
    pub href: String,
}

pub struct DetailView<'a> {
    pub collection_title: &'a str,
    pub section: &'a str,
    /// `None` for untitled items.
    pub title: Option<&'a str>,
    pub image: &'a ImageRef,
    pub date: Option<&'a str>,
    pub camera: Option<&'a str>,
    pub description: Option<&'a str>,
    pub copyright: Option<&'a str>,
    pub prev: Option<&'a Neighbor>,
    pub next: Option<&'a Neighbor>,
}

pub struct AboutView<'a> {
    pub title: &'a str,
    pub headline: &'a str,
    /// Markdown.
    pub text: &'a str,
    /// Image URL as configured; empty for none.
    pub image: &'a str,
}

/// Shared page chrome, built once per build.
#[derive(Debug, Clone)]
pub struct Templates {
    site_title: String,
    nav: Vec<NavLink>,
}

impl Templates {
    pub fn new(site_title: impl Into<String>, nav: Vec<NavLink>) -> Self {
        Self {
            site_title: site_title.into(),
            nav,
        }
    }

    pub fn gallery(&self, view: &GalleryView) -> String {
        let body_class = match view.kind {
            GalleryKind::Gallery => "gallery",
            GalleryKind::Cover => "cover",
        };
        let content = html! {
            main class={ (body_class) "-page" } {
                h1 { (view.title) }
                div class={ (body_class) "-grid" } {
                    @for tile in view.tiles {
                        @match &tile.href {
                            Some(href) => a.tile href=(href) { (render_tile(tile)) },
                            None => div.tile { (render_tile(tile)) },
                        }
                    }
                }
            }
        };
        self.document(view.title, view.section, Some(body_class), content)
            .into_string()
    }

    pub fn detail(&self, view: &DetailView) -> String {
        let page_title = match view.title {
            Some(title) => format!("{} - {}", view.collection_title, title),
            None => view.collection_title.to_string(),
        };
        let content = html! {
            main.detail-page {
                figure.frame {
                    img src=(view.image.src) srcset=(view.image.srcset) sizes=(DETAIL_SIZES)
                        alt=(view.image.alt) width=(view.image.width) height=(view.image.height);
                    figcaption {
                        @if let Some(title) = view.title {
                            h1 { (title) }
                        }
                        @if let Some(description) = view.description {
                            p.description { (description) }
                        }
                        @if let Some(date) = view.date {
                            p.date { (date) }
                        }
                        @if let Some(camera) = view.camera {
                            p.camera { (camera) }
                        }
                        @if let Some(copyright) = view.copyright {
                            p.copyright { "© " (copyright) }
                        }
                    }
                }
                nav.pager {
                    @if let Some(prev) = view.prev {
                        a.prev href=(prev.href) rel="prev" title=(prev.title) { "‹" }
                    }
                    a.up href="index.html" { (view.collection_title) }
                    @if let Some(next) = view.next {
                        a.next href=(next.href) rel="next" title=(next.title) { "›" }
                    }
                }
            }
        };
        self.document(&page_title, view.section, Some("detail"), content)
            .into_string()
    }

    pub fn about(&self, view: &AboutView) -> String {
        let parser = Parser::new(view.text);
        let mut body_html = String::new();
        md_html::push_html(&mut body_html, parser);

        let content = html! {
            main.about-page {
                @if !view.image.is_empty() {
                    img.portrait src=(view.image) alt=(view.title);
                }
                article {
                    @if !view.headline.is_empty() {
                        h1 { (view.headline) }
                    }
                    (PreEscaped(body_html))
                }
            }
        };
        self.document(view.title, "about", None, content).into_string()
    }

    fn document(&self, title: &str, section: &str, body_class: Option<&str>, content: Markup) -> Markup {
        let full_title = if title == self.site_title {
            title.to_string()
        } else {
            format!("{} | {}", title, self.site_title)
        };
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (full_title) }
                    link rel="stylesheet" href={ "/" (STYLESHEET_PATH) };
                }
                body class=[body_class] {
                    (self.header(section))
                    (content)
                }
            }
        }
    }

    fn header(&self, section: &str) -> Markup {
        html! {
            header.site-header {
                a.site-title href="/index.html" { (self.site_title) }
                nav.site-nav {
                    ul {
                        @for link in &self.nav {
                            li class=[(link.slug == section).then_some("current")] {
                                a href=(link.href()) { (link.title) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_tile(tile: &Tile) -> Markup {
    html! {
        @if let Some(image) = &tile.image {
            img src=(image.src) srcset=(image.srcset) sizes=(GALLERY_SIZES)
                alt=(image.alt) loading="lazy";
        }
        span.tile-title { (tile.title) }
    }
}

/// The site stylesheet: column counts as custom properties, then static rules.
pub fn stylesheet(cover_columns: u32, gallery_columns: u32) -> String {
    format!(
        ":root {{\n    --cover-columns: {};\n    --gallery-columns: {};\n}}\n\n{}",
        cover_columns, gallery_columns, CSS_STATIC
    )
}
