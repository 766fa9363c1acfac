//! View: store state + draft prompt → DomNode tree.

use umlforge_dom::DomNode;

use crate::decode::{decode_payload, DecodeOptions, ImageHandle};
use crate::state::StoreState;

pub const PROMPT_PLACEHOLDER: &str = "Enter PlantUML Prompt";
pub const RESULT_PLACEHOLDER: &str = "Enter a description and generate UML.";
pub const GENERATE_LABEL: &str = "Generate UML";

/// What the result region shows after a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayResult {
    Image(ImageHandle),
    Text(String),
}

/// The area under the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRegion {
    Loading,
    Result(DisplayResult),
    Placeholder,
}

/// Everything the view reads.
pub struct ViewModel<'a> {
    pub store: &'a StoreState,
    /// Local prompt text; never part of the store.
    pub draft: &'a str,
    pub decode: &'a DecodeOptions,
}

/// Decode the success payload, falling back to the raw text.
///
/// Returns `None` unless the latest request succeeded. Runs the decoder on
/// every call.
pub fn display_result(store: &StoreState, opts: &DecodeOptions) -> Option<DisplayResult> {
    if !store.request.success {
        return None;
    }
    let payload = store.payload()?;
    match decode_payload(payload, opts) {
        Ok(image) => Some(DisplayResult::Image(image)),
        Err(e) => {
            tracing::debug!(
                error = %e,
                len = payload.len(),
                "payload is not an image, showing text"
            );
            Some(DisplayResult::Text(payload.to_string()))
        }
    }
}

pub fn result_region(store: &StoreState, opts: &DecodeOptions) -> ResultRegion {
    if store.request.pending {
        return ResultRegion::Loading;
    }
    match display_result(store, opts) {
        Some(DisplayResult::Text(text)) if text.is_empty() => ResultRegion::Placeholder,
        Some(result) => ResultRegion::Result(result),
        None => ResultRegion::Placeholder,
    }
}

pub fn render_view(vm: &ViewModel<'_>) -> DomNode {
    let prompt = DomNode::element("input")
        .with_key("prompt")
        .with_attr("type", "text")
        .with_attr("class", "prompt")
        .with_attr("placeholder", PROMPT_PLACEHOLDER)
        .with_attr("value", vm.draft)
        .on("input", "draft_input");

    let button = DomNode::text("button", GENERATE_LABEL)
        .with_key("generate")
        .with_attr("class", "generate")
        .on("click", "generate");

    let region = match result_region(vm.store, vm.decode) {
        ResultRegion::Loading => DomNode::element("div")
            .with_key("loading")
            .with_attr("class", "loading")
            .with_child(DomNode::element("div").with_attr("class", "spinner")),
        ResultRegion::Result(DisplayResult::Image(image)) => result_box(
            DomNode::element("img")
                .with_key("diagram")
                .with_attr("src", &image.to_data_uri())
                .with_attr("alt", "Generated UML"),
        ),
        ResultRegion::Result(DisplayResult::Text(text)) => result_box(text_area(&text)),
        ResultRegion::Placeholder => result_box(text_area(RESULT_PLACEHOLDER)),
    };

    DomNode::element("div")
        .with_key("studio")
        .with_attr("class", "studio")
        .with_children([prompt, button, region])
}

fn result_box(content: DomNode) -> DomNode {
    DomNode::element("div")
        .with_key("result")
        .with_attr("class", "result")
        .with_child(content)
}

fn text_area(text: &str) -> DomNode {
    DomNode::text("textarea", text)
        .with_key("source")
        .with_attr("readonly", "readonly")
}
