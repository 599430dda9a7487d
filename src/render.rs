use crate::response::{Block, BlockType, RichText};
use itertools::Itertools;
use maud::{html, Markup, PreEscaped, Render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListState {
    Outside,
    Inside,
}

/// Turns a flat stream of blocks into one HTML fragment
///
/// Consecutive bulleted list items share a single `<ul>`. Which list is open is tracked here
/// rather than read back from the output, and a list still open when the stream ends is
/// closed by [`HtmlRenderer::finish`].
pub struct HtmlRenderer {
    state: ListState,
    output: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        HtmlRenderer {
            state: ListState::Outside,
            output: String::new(),
        }
    }

    pub fn push(&mut self, block: &Block) {
        match &block.ty {
            BlockType::BulletedListItem(item) => {
                if self.state == ListState::Outside {
                    self.output.push_str("<ul>\n");
                    self.state = ListState::Inside;
                }

                html! {
                    li { (render_rich_text(&item.rich_text)) } "\n"
                }
                .render_to(&mut self.output);
            }
            BlockType::Paragraph(paragraph) => {
                self.close_list();
                html! {
                    p { (render_rich_text(&paragraph.rich_text)) } "\n"
                }
                .render_to(&mut self.output);
            }
            BlockType::HeadingOne(heading) => {
                self.close_list();
                html! {
                    h1 { (render_plain_text(&heading.rich_text)) } "\n"
                }
                .render_to(&mut self.output);
            }
            BlockType::HeadingTwo(heading) => {
                self.close_list();
                html! {
                    h2 { (render_plain_text(&heading.rich_text)) } "\n"
                }
                .render_to(&mut self.output);
            }
            BlockType::HeadingThree(heading) => {
                self.close_list();
                html! {
                    h3 { (render_plain_text(&heading.rich_text)) } "\n"
                }
                .render_to(&mut self.output);
            }
            BlockType::Unsupported { ty } => {
                log::trace!("Skipping block {} of unsupported type {}", block.id, ty);
            }
        }
    }

    fn close_list(&mut self) {
        if self.state == ListState::Inside {
            self.output.push_str("</ul>\n");
            self.state = ListState::Outside;
        }
    }

    pub fn finish(mut self) -> Markup {
        self.close_list();
        PreEscaped(self.output)
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_blocks<'a, I>(blocks: I) -> Markup
where
    I: IntoIterator<Item = &'a Block>,
{
    let mut renderer = HtmlRenderer::new();
    blocks.into_iter().for_each(|block| renderer.push(block));
    renderer.finish()
}

fn render_rich_text(rich_text: &[RichText]) -> Markup {
    PreEscaped(
        rich_text
            .iter()
            .map(|segment| segment.render().into_string())
            .join(" "),
    )
}

// Headings drop inline annotations
fn render_plain_text(rich_text: &[RichText]) -> String {
    rich_text
        .iter()
        .map(|segment| segment.plain_text.as_str())
        .join(" ")
}

impl Render for RichText {
    // Innermost first, so a fully annotated span reads
    // <code><u><s><em><strong>text</strong></em></s></u></code>
    fn render(&self) -> Markup {
        let annotations = &self.annotations;
        let mut markup = html! { (self.plain_text) };

        if annotations.bold {
            markup = html! { strong { (markup) } };
        }
        if annotations.italic {
            markup = html! { em { (markup) } };
        }
        if annotations.strikethrough {
            markup = html! { s { (markup) } };
        }
        if annotations.underline {
            markup = html! { u { (markup) } };
        }
        if annotations.code {
            markup = html! { code { (markup) } };
        }

        markup
    }
}
