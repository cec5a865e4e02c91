//! Google News RSS search feed.

use chrono::{DateTime, NaiveDate};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::article::clean_text;
use crate::error::SentimentError;
use crate::types::NewsItem;

#[derive(Default)]
struct ItemFields {
    title: String,
    link: String,
    pub_date: String,
}

impl ItemFields {
    fn set(&mut self, tag: &str, text: String) {
        match tag {
            "title" => self.title = text,
            "link" => self.link = text,
            "pubDate" => self.pub_date = text,
            _ => {}
        }
    }

    fn into_item(self) -> Option<NewsItem> {
        if self.link.is_empty() {
            return None;
        }
        let Some(date) = parse_pub_date(&self.pub_date) else {
            tracing::debug!(link = %self.link, pub_date = %self.pub_date, "dropping item with unparsable pubDate");
            return None;
        };
        Some(NewsItem {
            date,
            title: clean_text(&self.title),
            link: self.link,
        })
    }
}

/// Parse a Google News RSS body into [`NewsItem`]s, in feed order.
///
/// Items without a link or with a `pubDate` that is not valid RFC 2822 are
/// dropped.
///
/// # Errors
///
/// Returns [`SentimentError::Xml`] if the XML is malformed.
pub(crate) fn parse_rss_feed(xml: &str) -> Result<Vec<NewsItem>, SentimentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemFields> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    current = Some(ItemFields::default());
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take().and_then(ItemFields::into_item) {
                        items.push(item);
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(fields) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    fields.set(&current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(fields) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    fields.set(&current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SentimentError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

/// Calendar date of an RFC 2822 timestamp, in the timestamp's own offset.
fn parse_pub_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.date_naive())
}
