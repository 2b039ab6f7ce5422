//! crates/rpt_core/src/page.rs
//! Page records and the loose field set accepted by `Payload::add_page`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::metric::MetricTile;

/// Define an enum with explicit wire tokens, `as_str` and `FromStr`.
macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident ($field:expr) => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    other => Err(CoreError::UnknownToken { field: $field, value: other.to_string() }),
                }
            }
        }
    };
}

token_enum!(
    /// Kind of page; drives which top-level template block is used.
    PageType ("page_type") => {
        Cover   = "cover",
        Chapter = "chapter",
        Report  = "report"
    }
);

token_enum!(
    /// Arrangement of a report page's content regions.
    PageLayout ("page_layout") => {
        Simple         = "simple",
        LeftCommentary = "left-commentary",
        Plot           = "plot"
    }
);

/// Style of a page message. Unrecognized styles pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageStyle {
    Warning,
    Danger,
    Info,
    Success,
    Other(String),
}

impl MessageStyle {
    pub fn as_str(&self) -> &str {
        match self {
            MessageStyle::Warning => "warning",
            MessageStyle::Danger => "danger",
            MessageStyle::Info => "info",
            MessageStyle::Success => "success",
            MessageStyle::Other(s) => s,
        }
    }
}

impl fmt::Display for MessageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MessageStyle {
    fn from(s: &str) -> Self {
        match s {
            "warning" => MessageStyle::Warning,
            "danger" => MessageStyle::Danger,
            "info" => MessageStyle::Info,
            "success" => MessageStyle::Success,
            other => MessageStyle::Other(other.to_string()),
        }
    }
}

impl From<String> for MessageStyle {
    fn from(s: String) -> Self {
        MessageStyle::from(s.as_str())
    }
}

impl From<MessageStyle> for String {
    fn from(style: MessageStyle) -> Self {
        match style {
            MessageStyle::Other(s) => s,
            named => named.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageMessage {
    pub message: String,
    pub style: MessageStyle,
}

impl PageMessage {
    pub fn new(message: impl Into<String>, style: MessageStyle) -> Self {
        Self { message: message.into(), style }
    }
}

/// One appended page. Every optional field serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_type: PageType,
    pub page_layout: Option<PageLayout>,
    pub page_title: String,
    pub page_subheading: Option<String>,
    /// Rich markup, passed through verbatim.
    pub page_commentary: Option<String>,
    pub page_message: Option<PageMessage>,
    pub page_notification: Option<String>,
    pub page_metrics: Option<Vec<MetricTile>>,
    /// Pre-rendered table markup.
    #[serde(rename = "page_dataframe")]
    pub page_table: Option<String>,
    pub page_visualisation: Option<String>,
    pub page_background: Option<String>,
}

/// Inputs to `Payload::add_page`. Only `page_type` and `page_title` are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFields {
    pub page_type: Option<PageType>,
    pub page_title: Option<String>,
    pub page_layout: Option<PageLayout>,
    pub page_subheading: Option<String>,
    pub page_commentary: Option<String>,
    pub page_message: Option<PageMessage>,
    pub page_notification: Option<String>,
    pub page_metrics: Option<Vec<MetricTile>>,
    /// Tabular input for the table formatter; unrecognized shapes are dropped.
    pub page_table_source: Option<Value>,
    pub page_visualisation: Option<String>,
    pub page_background: Option<String>,
}

impl PageFields {
    pub fn new(page_type: PageType, page_title: impl Into<String>) -> Self {
        Self {
            page_type: Some(page_type),
            page_title: Some(page_title.into()),
            ..Self::default()
        }
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.page_layout = Some(layout);
        self
    }

    pub fn subheading(mut self, text: impl Into<String>) -> Self {
        self.page_subheading = Some(text.into());
        self
    }

    pub fn commentary(mut self, markup: impl Into<String>) -> Self {
        self.page_commentary = Some(markup.into());
        self
    }

    pub fn message(mut self, message: PageMessage) -> Self {
        self.page_message = Some(message);
        self
    }

    pub fn notification(mut self, text: impl Into<String>) -> Self {
        self.page_notification = Some(text.into());
        self
    }

    pub fn metrics(mut self, tiles: Vec<MetricTile>) -> Self {
        self.page_metrics = Some(tiles);
        self
    }

    pub fn table_source(mut self, source: Value) -> Self {
        self.page_table_source = Some(source);
        self
    }

    pub fn visualisation(mut self, path: impl Into<String>) -> Self {
        self.page_visualisation = Some(path.into());
        self
    }

    pub fn background(mut self, path: impl Into<String>) -> Self {
        self.page_background = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_str() {
        assert_eq!("left-commentary".parse::<PageLayout>().unwrap(), PageLayout::LeftCommentary);
        assert_eq!(PageType::Chapter.as_str(), "chapter");
        assert_eq!(MessageStyle::Danger.to_string(), "danger");
    }

    #[test]
    fn message_styles_outside_the_named_set_pass_through() {
        assert_eq!(MessageStyle::from("info"), MessageStyle::Info);
        assert_eq!(MessageStyle::from("primary"), MessageStyle::Other("primary".into()));

        let msg = PageMessage::new("hi", MessageStyle::from("dark"));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({ "message": "hi", "style": "dark" })
        );
        let back: PageMessage = serde_json::from_str(r#"{"message":"hi","style":"warning"}"#).unwrap();
        assert_eq!(back.style, MessageStyle::Warning);
    }

    #[test]
    fn unknown_token_names_the_field() {
        let err = "appendix".parse::<PageType>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownToken { field: "page_type", value: "appendix".into() }
        );
    }

    #[test]
    fn page_serializes_with_template_field_names() {
        let page = Page {
            page_type: PageType::Report,
            page_layout: Some(PageLayout::Plot),
            page_title: "Sessions".into(),
            page_subheading: None,
            page_commentary: None,
            page_message: Some(PageMessage::new("careful", MessageStyle::Warning)),
            page_notification: None,
            page_metrics: None,
            page_table: Some("<table></table>".into()),
            page_visualisation: Some("plot.png".into()),
            page_background: None,
        };
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["page_type"], "report");
        assert_eq!(v["page_layout"], "plot");
        assert_eq!(v["page_dataframe"], "<table></table>");
        assert_eq!(v["page_message"]["style"], "warning");
        assert!(v["page_metrics"].is_null());
        assert!(v.get("page_table").is_none());
        assert_eq!(v.as_object().unwrap().len(), 11);
    }
}
