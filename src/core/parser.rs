//! NFO document parser.
//!
//! Turns raw NFO bytes into a typed [`NfoDocument`]. Unknown elements are
//! ignored for forward compatibility; whitespace-only text collapses to
//! absent rather than empty string. Repeated `<genre>` and `<actor>`
//! elements accumulate in document order, which reflects the curator's
//! billing order and must survive the round trip to the library service.
//!
//! Numeric fields that are present but unparsable are parse errors, never
//! silently dropped: a malformed number is more likely operator error than
//! an absent field.

use crate::models::record::Actor;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// A parsed NFO document before classification.
///
/// Carries the root element name plus every field the engine understands;
/// the classifier selects the variant and discards what the variant does
/// not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfoDocument {
    /// Lowercased root element name (e.g. "tvshow", "episodedetails").
    pub root: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<u16>,
    pub plot: Option<String>,
    pub rating: Option<f32>,
    pub studio: Option<String>,
    pub mpaa: Option<String>,
    pub genres: Vec<String>,
    pub named_seasons: BTreeMap<u16, String>,
    pub actors: Vec<Actor>,
    pub season_number: Option<u16>,
    pub episode_number: Option<u16>,
    pub episode_count: Option<u32>,
}

/// Actor element being accumulated during parsing.
#[derive(Default)]
struct PartialActor {
    name: Option<String>,
    role: Option<String>,
    thumb: Option<String>,
}

/// Parse raw NFO bytes into a document.
pub fn parse(bytes: &[u8]) -> Result<NfoDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Parse(format!("document is not valid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut doc = NfoDocument::default();
    let mut title: Option<String> = None;

    // Path of currently open elements, lowercased.
    let mut stack: Vec<String> = Vec::new();
    let mut actor: Option<PartialActor> = None;
    // Number attribute of the <namedseason> currently open.
    let mut named_season: Option<u16> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = element_name(&start);
                if stack.is_empty() {
                    doc.root = name.clone();
                } else if stack.len() == 1 {
                    match name.as_str() {
                        "actor" => actor = Some(PartialActor::default()),
                        "namedseason" => {
                            named_season = Some(named_season_number(&start)?);
                        }
                        _ => {}
                    }
                }
                stack.push(name);
            }
            Ok(Event::Empty(start)) => {
                // Self-closing element: no text, so nothing to record
                // beyond root detection.
                if stack.is_empty() {
                    doc.root = element_name(&start);
                    break;
                }
            }
            Ok(Event::Text(t)) => {
                let value = t
                    .unescape()
                    .map_err(|e| Error::Parse(format!("bad text content: {e}")))?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    continue;
                }
                record_text(&mut doc, &mut title, &stack, &mut actor, named_season, value)?;
            }
            Ok(Event::CData(t)) => {
                let value = String::from_utf8(t.into_inner().to_vec())
                    .map_err(|e| Error::Parse(format!("bad CDATA content: {e}")))?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    continue;
                }
                record_text(&mut doc, &mut title, &stack, &mut actor, named_season, value)?;
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                if stack.len() == 1 {
                    match closed.as_deref() {
                        Some("actor") => {
                            if let Some(partial) = actor.take() {
                                // An actor without a name is noise, not data.
                                if let Some(name) = partial.name {
                                    doc.actors.push(Actor {
                                        name,
                                        role: partial.role,
                                        thumb_url: partial.thumb,
                                    });
                                }
                            }
                        }
                        Some("namedseason") => named_season = None,
                        _ => {}
                    }
                }
                if stack.is_empty() {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Parse(format!("malformed markup: {e}"))),
        }
    }

    if doc.root.is_empty() {
        return Err(Error::Parse("document has no root element".to_string()));
    }

    // Title is required; originaltitle alone satisfies it.
    match title.or_else(|| doc.original_title.clone()) {
        Some(t) => doc.title = t,
        None => {
            return Err(Error::Parse(
                "missing required <title>/<originaltitle> element".to_string(),
            ))
        }
    }

    Ok(doc)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_lowercase()
}

/// Read the required `number` attribute off a `<namedseason>` element.
fn named_season_number(start: &BytesStart<'_>) -> Result<u16> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Parse(format!("bad attribute: {e}")))?;
        if attr.key.as_ref() == b"number" {
            let raw = String::from_utf8_lossy(&attr.value).to_string();
            return parse_number::<u16>("namedseason number", &raw);
        }
    }
    Err(Error::Parse(
        "<namedseason> is missing its number attribute".to_string(),
    ))
}

/// Route a non-empty text node to the field its element path names.
fn record_text(
    doc: &mut NfoDocument,
    title: &mut Option<String>,
    stack: &[String],
    actor: &mut Option<PartialActor>,
    named_season: Option<u16>,
    value: String,
) -> Result<()> {
    match stack {
        // Depth 1: direct children of the root element.
        [_, field] => match field.as_str() {
            "title" => *title = Some(value),
            "originaltitle" => doc.original_title = Some(value),
            "plot" => doc.plot = Some(value),
            "studio" => doc.studio = Some(value),
            "mpaa" => doc.mpaa = Some(value),
            "genre" => doc.genres.push(value),
            "year" => doc.year = Some(parse_number("year", &value)?),
            "rating" => doc.rating = Some(parse_number("rating", &value)?),
            "season" | "seasonnumber" => {
                doc.season_number = Some(parse_number("season", &value)?)
            }
            "episode" => doc.episode_number = Some(parse_number("episode", &value)?),
            "episodecount" => {
                doc.episode_count = Some(parse_number("episodecount", &value)?)
            }
            "namedseason" => {
                if let Some(number) = named_season {
                    doc.named_seasons.insert(number, value);
                }
            }
            // Unknown elements are ignored, not errors.
            _ => {}
        },
        // Depth 2: children of an <actor> element.
        [_, parent, sub] if parent == "actor" => {
            if let Some(partial) = actor.as_mut() {
                match sub.as_str() {
                    "name" => partial.name = Some(value),
                    "role" => partial.role = Some(value),
                    "thumb" => partial.thumb = Some(value),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Parse(format!("invalid number in <{field}>: '{raw}'")))
}
