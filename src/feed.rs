use crate::error::{parse_error, Result};
use crate::event::{Component, Event};
use chrono::prelude::*;
use chrono::Duration;
use chrono_tz::Tz;
use ical::parser::ical::component::{IcalCalendar, IcalEvent};
use ical::property::Property;
use std::collections::HashMap;
use std::io::BufReader;
use tracing::{debug, warn};

/// Components of a calendar feed keyed by identifier, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    entries: Vec<(String, Component)>,
    index: HashMap<String, usize>,
}

impl Feed {
    /// Insert a component, replacing an earlier one with the same identifier in place
    pub fn insert(&mut self, id: String, component: Component) {
        match self.index.get(&id) {
            Some(&slot) => self.entries[slot].1 = component,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, component));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.index.get(id).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), c))
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().filter_map(|(_, c)| c.as_event())
    }
}

/// Parse iCalendar text. Floating and date-only times are read in `tz`.
///
/// Each top-level component is parsed on its own, so a broken or unknown
/// block is skipped and the rest of the feed still comes through. The call
/// only fails when the text holds no VCALENDAR at all.
pub fn parse_feed(text: &str, tz: Tz) -> Result<Feed> {
    let blocks = split_blocks(text).ok_or_else(|| parse_error("no VCALENDAR found"))?;
    let mut feed = Feed::default();
    let mut anonymous = 0;

    for block in &blocks {
        if !KNOWN_COMPONENTS.contains(&block.kind.as_str()) {
            debug!(kind = %block.kind, "Ignoring unsupported component");
            continue;
        }
        match parse_block(block) {
            Ok(calendar) => absorb(&mut feed, calendar, tz, &mut anonymous),
            Err(e) => warn!(kind = %block.kind, line = block.line, "Skipping component: {}", e),
        }
    }

    debug!(components = feed.len(), "Parsed calendar feed");
    Ok(feed)
}

const KNOWN_COMPONENTS: [&str; 5] = ["VEVENT", "VTODO", "VJOURNAL", "VFREEBUSY", "VTIMEZONE"];

/// Raw text of one component directly under a VCALENDAR
#[derive(Debug)]
struct Block {
    kind: String,
    /// Line number of its BEGIN
    line: usize,
    text: String,
}

/// Cut the document into top-level component blocks. Calendar properties
/// and stray lines between components are dropped, unterminated blocks too.
/// `None` when there is no BEGIN:VCALENDAR.
fn split_blocks(text: &str) -> Option<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut found = false;
    let mut in_calendar = false;
    let mut current: Option<Block> = None;
    let mut depth = 0usize;

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;

        // Folded continuation of the previous line
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(block) = current.as_mut() {
                block.text.push_str(line);
                block.text.push_str("\r\n");
            }
            continue;
        }

        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        let begin = name.trim().eq_ignore_ascii_case("BEGIN");
        let end = name.trim().eq_ignore_ascii_case("END");
        let calendar = value.trim().eq_ignore_ascii_case("VCALENDAR");

        if (begin || end) && calendar {
            if let Some(block) = current.take() {
                warn!(kind = %block.kind, line = block.line, "Dropping unterminated component");
            }
            found |= begin;
            in_calendar = begin;
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.text.push_str(line);
            block.text.push_str("\r\n");
            if begin {
                depth += 1;
            } else if end {
                depth -= 1;
            }
            if depth == 0 {
                blocks.extend(current.take());
            }
        } else if begin && in_calendar {
            current = Some(Block {
                kind: value.trim().to_ascii_uppercase(),
                line: number,
                text: format!("{}\r\n", line),
            });
            depth = 1;
        }
    }

    if let Some(block) = current {
        warn!(kind = %block.kind, line = block.line, "Dropping unterminated component");
    }
    found.then_some(blocks)
}

fn parse_block(block: &Block) -> Result<IcalCalendar> {
    let wrapped = format!("BEGIN:VCALENDAR\r\n{}END:VCALENDAR\r\n", block.text);
    let mut reader = ical::IcalParser::new(BufReader::new(wrapped.as_bytes()));
    match reader.next() {
        Some(Ok(calendar)) => Ok(calendar),
        Some(Err(e)) => Err(parse_error(e.to_string())),
        None => Err(parse_error("empty component")),
    }
}

fn absorb(feed: &mut Feed, calendar: IcalCalendar, tz: Tz, anonymous: &mut usize) {
    for event in parse_events(calendar.events, tz) {
        let id = if event.uid.is_empty() {
            *anonymous += 1;
            format!("event-{}", anonymous)
        } else {
            event_key(&event)
        };
        feed.insert(id, Component::Event(event.event));
    }

    for todo in calendar.todos {
        if let Some(uid) = text_value(&todo.properties, "UID") {
            feed.insert(uid.clone(), Component::Todo { uid });
        }
    }
    for journal in calendar.journals {
        if let Some(uid) = text_value(&journal.properties, "UID") {
            feed.insert(uid.clone(), Component::Journal { uid });
        }
    }
    for free_busy in calendar.free_busys {
        if let Some(uid) = text_value(&free_busy.properties, "UID") {
            feed.insert(uid.clone(), Component::FreeBusy { uid });
        }
    }
    for timezone in calendar.timezones {
        if let Some(tzid) = text_value(&timezone.properties, "TZID") {
            feed.insert(tzid.clone(), Component::Timezone { tzid });
        }
    }
}

/// An event together with the bits that only matter for keying it
struct ParsedEvent {
    uid: String,
    recurrence_id: Option<String>,
    event: Event,
}

fn event_key(parsed: &ParsedEvent) -> String {
    match &parsed.recurrence_id {
        Some(rid) => format!("{}@{}", parsed.uid, rid),
        None => parsed.uid.clone(),
    }
}

fn parse_events(events: Vec<IcalEvent>, tz: Tz) -> Vec<ParsedEvent> {
    events
        .iter()
        .filter_map(|event| match parse_event(event, tz) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                let uid = text_value(&event.properties, "UID").unwrap_or_default();
                warn!(uid = %uid, "Skipping event: {}", e);
                None
            }
        })
        .collect()
}

fn parse_event(event: &IcalEvent, tz: Tz) -> Result<ParsedEvent> {
    let start = property(&event.properties, "DTSTART")
        .ok_or_else(|| parse_error("missing DTSTART"))?;
    let start = parse_stamp(start, tz)?;

    let end = match property(&event.properties, "DTEND") {
        Some(end) => Some(parse_stamp(end, tz)?.last_instant(&start)?),
        None => match text_value(&event.properties, "DURATION") {
            Some(value) => {
                let duration = parse_duration(&value)
                    .ok_or_else(|| parse_error(format!("bad DURATION {}", value)))?;
                Some(start.plus(duration)?)
            }
            None => None,
        },
    };

    let uid = text_value(&event.properties, "UID")
        .map(|uid| uid.trim().to_string())
        .unwrap_or_default();
    let recurrence_id = property(&event.properties, "RECURRENCE-ID")
        .and_then(|p| p.value.as_ref())
        .map(|v| v.trim().to_string());

    Ok(ParsedEvent {
        event: Event {
            uid: uid.clone(),
            summary: text_value(&event.properties, "SUMMARY").unwrap_or_default(),
            start: start.instant,
            end,
            location: text_value(&event.properties, "LOCATION")
                .filter(|location| !location.trim().is_empty()),
        },
        uid,
        recurrence_id,
    })
}

/// A DTSTART or DTEND value resolved to an instant
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stamp {
    instant: DateTime<Utc>,
    /// Set for date-only values
    date: Option<NaiveDate>,
    zone: Tz,
}

impl Stamp {
    /// Last instant covered when used as an end. A date-only end is
    /// exclusive, so it becomes the start of the day before.
    fn last_instant(&self, start: &Stamp) -> Result<DateTime<Utc>> {
        match self.date {
            Some(date) => {
                let last_day = date.pred_opt().unwrap_or(date);
                let instant = localize(self.zone, &last_day.and_time(NaiveTime::MIN))?;
                Ok(instant.max(start.instant))
            }
            None => Ok(self.instant),
        }
    }

    fn plus(&self, duration: Duration) -> Result<DateTime<Utc>> {
        let whole_days = duration.num_seconds() % 86_400 == 0 && duration > Duration::zero();
        match self.date {
            Some(date) if whole_days => {
                let last_day = date
                    .checked_add_signed(duration - Duration::days(1))
                    .ok_or_else(|| parse_error("DURATION out of range"))?;
                localize(self.zone, &last_day.and_time(NaiveTime::MIN))
            }
            _ => self
                .instant
                .checked_add_signed(duration)
                .ok_or_else(|| parse_error("DURATION out of range")),
        }
    }
}

fn parse_stamp(property: &Property, default_tz: Tz) -> Result<Stamp> {
    let value = property
        .value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| parse_error(format!("{} has no value", property.name)))?;
    let zone = zone_of(property, default_tz);

    let date_only = param(property, "VALUE").map_or(false, |v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if date_only {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d")
            .map_err(|e| parse_error(format!("bad date {}: {}", value, e)))?;
        return Ok(Stamp {
            instant: localize(zone, &date.and_time(NaiveTime::MIN))?,
            date: Some(date),
            zone,
        });
    }

    //Try getting an UTC time first
    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .map_err(|e| parse_error(format!("bad date-time {}: {}", value, e)))?;
        return Ok(Stamp {
            instant: Utc.from_utc_datetime(&naive),
            date: None,
            zone,
        });
    }

    //Zoned or floating time
    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .map_err(|e| parse_error(format!("bad date-time {}: {}", value, e)))?;
    Ok(Stamp {
        instant: localize(zone, &naive)?,
        date: None,
        zone,
    })
}

fn zone_of(property: &Property, default_tz: Tz) -> Tz {
    match param(property, "TZID") {
        Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(tzid = name, "Unknown TZID, reading time in {}", default_tz);
            default_tz
        }),
        None => default_tz,
    }
}

/// Local wall-clock time to UTC. A repeated hour resolves to its first occurrence.
fn localize(tz: Tz, naive: &NaiveDateTime) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| parse_error(format!("{} does not exist in {}", naive, tz)))
}

/// `[+|-]P[nW][nD][T[nH][nM][nS]]`
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.chars().next()? {
        '-' => (true, &value[1..]),
        '+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P').or_else(|| rest.strip_prefix('p'))?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut seen = false;
    let mut digits = String::new();
    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            '0'..='9' => digits.push(c),
            'T' if !in_time && digits.is_empty() => in_time = true,
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let part = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n)?,
                    ('D', false) => Duration::try_days(n)?,
                    ('H', true) => Duration::try_hours(n)?,
                    ('M', true) => Duration::try_minutes(n)?,
                    ('S', true) => Duration::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
                seen = true;
            }
        }
    }
    if !seen || !digits.is_empty() {
        return None;
    }
    Some(if negative { -total } else { total })
}

fn property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|v| v.trim().trim_matches('"'))
}

fn text_value(properties: &[Property], name: &str) -> Option<String> {
    property(properties, name)?
        .value
        .as_deref()
        .map(unescape_text)
}

/// Undo TEXT escaping (`\n`, `\,`, `\;`, `\\`)
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Taipei;
    use ical::parser::ical::component::IcalEvent;
    use ical::property::Property;

    fn prop(name: &str, params: Option<Vec<(&str, &str)>>, value: &str) -> Property {
        Property {
            name: String::from(name),
            params: params.map(|params| {
                params
                    .into_iter()
                    .map(|(k, v)| (String::from(k), vec![String::from(v)]))
                    .collect()
            }),
            value: Some(String::from(value)),
        }
    }

    fn only_event(events: Vec<IcalEvent>) -> Event {
        let mut parsed = parse_events(events, Taipei);
        assert_eq!(parsed.len(), 1);
        parsed.remove(0).event
    }

    #[test]
    fn parse_events_works() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![
                prop("UID", None, "abc"),
                prop("DTSTART", None, "20200121T200000Z"),
                prop("SUMMARY", None, "foo"),
            ],
        }];

        assert_eq!(
            only_event(events),
            Event {
                uid: String::from("abc"),
                summary: String::from("foo"),
                start: Utc.with_ymd_and_hms(2020, 1, 21, 20, 0, 0).unwrap(),
                end: None,
                location: None,
            }
        );
    }

    #[test]
    fn parse_events_with_timezone() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![
                prop(
                    "DTSTART",
                    Some(vec![("TZID", "America/New_York")]),
                    "20200110T150000",
                ),
                prop("DTEND", Some(vec![("TZID", "America/New_York")]), "20200110T160000"),
                prop("SUMMARY", None, "foo"),
            ],
        }];

        let event = only_event(events);
        assert_eq!(event.start, Utc.with_ymd_and_hms(2020, 1, 10, 20, 0, 0).unwrap());
        assert_eq!(event.end, Some(Utc.with_ymd_and_hms(2020, 1, 10, 21, 0, 0).unwrap()));
    }

    #[test]
    fn floating_time_uses_default_zone() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![prop("DTSTART", None, "20240301T090000")],
        }];
        // 09:00 in Taipei is 01:00 UTC
        assert_eq!(
            only_event(events).start,
            Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn unknown_tzid_falls_back_to_default_zone() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![prop(
                "DTSTART",
                Some(vec![("TZID", "Taipei Standard Time")]),
                "20240301T090000",
            )],
        }];
        assert_eq!(
            only_event(events).start,
            Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn all_day_end_is_exclusive() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![
                prop("DTSTART", Some(vec![("VALUE", "DATE")]), "20240301"),
                prop("DTEND", Some(vec![("VALUE", "DATE")]), "20240303"),
            ],
        }];
        let event = only_event(events);
        // Midnight in Taipei, the event covers March 1st and 2nd
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 2, 29, 16, 0, 0).unwrap());
        assert_eq!(event.end, Some(Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap()));
    }

    #[test]
    fn single_all_day_event_ends_on_its_own_day() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![
                prop("DTSTART", None, "20240301"),
                prop("DTEND", None, "20240302"),
            ],
        }];
        let event = only_event(events);
        assert_eq!(event.end, Some(event.start));
    }

    #[test]
    fn duration_sets_end() {
        let events = vec![IcalEvent {
            alarms: vec![],
            properties: vec![
                prop("DTSTART", None, "20240301T090000Z"),
                prop("DURATION", None, "PT1H30M"),
            ],
        }];
        assert_eq!(
            only_event(events).end,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn broken_events_are_skipped() {
        let events = vec![
            IcalEvent {
                alarms: vec![],
                properties: vec![prop("SUMMARY", None, "no start")],
            },
            IcalEvent {
                alarms: vec![],
                properties: vec![prop("DTSTART", None, "yesterday-ish")],
            },
            IcalEvent {
                alarms: vec![],
                properties: vec![
                    prop("DTSTART", None, "20240301T090000Z"),
                    prop("SUMMARY", None, "fine"),
                ],
            },
        ];
        assert_eq!(only_event(events).summary, "fine");
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT1H"), Some(Duration::hours(1)));
        assert_eq!(parse_duration("P1DT12H"), Some(Duration::hours(36)));
        assert_eq!(parse_duration("P2W"), Some(Duration::days(14)));
        assert_eq!(parse_duration("-PT15M"), Some(Duration::minutes(-15)));
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("P1H"), None);
        assert_eq!(parse_duration("1H"), None);
        assert_eq!(parse_duration("PT5"), None);
    }

    #[test]
    fn text_unescaping() {
        assert_eq!(unescape_text(r"Room 1\, 2nd floor"), "Room 1, 2nd floor");
        assert_eq!(unescape_text(r"a\;b\\c\nd"), "a;b\\c\nd");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//test//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Asia/Taipei\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0800\r\n\
TZOFFSETTO:+0800\r\n\
TZNAME:CST\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:one@test\r\n\
DTSTART;TZID=Asia/Taipei:20240301T190000\r\n\
DTEND;TZID=Asia/Taipei:20240301T210000\r\n\
SUMMARY:Hack night\r\n\
LOCATION:Room 101\\, CS building\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:two@test\r\n\
DTSTART:20240302T020000Z\r\n\
SUMMARY:Workshop\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:one@test\r\n\
RECURRENCE-ID;TZID=Asia/Taipei:20240308T190000\r\n\
DTSTART;TZID=Asia/Taipei:20240308T200000\r\n\
SUMMARY:Hack night (late)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parses_feed_in_document_order() {
        let feed = parse_feed(FEED, Taipei).unwrap();

        let titles: Vec<&str> = feed.events().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, vec!["Hack night", "Workshop", "Hack night (late)"]);

        let first = feed.get("one@test").and_then(Component::as_event).unwrap();
        assert_eq!(first.location.as_deref(), Some("Room 101, CS building"));
        assert!(feed.get("one@test@20240308T190000").is_some());
        assert_eq!(
            feed.get("Asia/Taipei"),
            Some(&Component::Timezone {
                tzid: String::from("Asia/Taipei")
            })
        );
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_feed(FEED, Taipei).unwrap(), parse_feed(FEED, Taipei).unwrap());
    }

    #[test]
    fn same_uid_replaces_in_place() {
        let mut feed = Feed::default();
        let event = |summary: &str| {
            Component::Event(Event {
                uid: String::from("x"),
                summary: String::from(summary),
                start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                end: None,
                location: None,
            })
        };
        feed.insert(String::from("x"), event("old"));
        feed.insert(String::from("y"), event("other"));
        feed.insert(String::from("x"), event("new"));

        let titles: Vec<&str> = feed.events().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, vec!["new", "other"]);
    }

    fn wrap(body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\n{}END:VCALENDAR\r\n",
            body
        )
    }

    const GOOD_EVENT: &str = "BEGIN:VEVENT\r\n\
UID:good@test\r\n\
DTSTART:20240310T010000Z\r\n\
SUMMARY:Still here\r\n\
END:VEVENT\r\n";

    fn titles(feed: &Feed) -> Vec<&str> {
        feed.events().map(|e| e.summary.as_str()).collect()
    }

    #[test]
    fn garbage_line_only_loses_its_own_event() {
        let broken = "BEGIN:VEVENT\r\n\
UID:broken@test\r\n\
DTSTART:20240310T020000Z\r\n\
THIS LINE HAS NO COLON\r\n\
END:VEVENT\r\n";
        let text = wrap(&format!("{}{}{}", GOOD_EVENT, broken, GOOD_EVENT.replace("good@", "later@")));

        let feed = parse_feed(&text, Taipei).unwrap();
        assert_eq!(titles(&feed), vec!["Still here", "Still here"]);
        assert!(feed.get("broken@test").is_none());
        assert!(feed.get("later@test").is_some());
    }

    #[test]
    fn unknown_components_are_ignored() {
        let weird = "BEGIN:X-WEIRD\r\nFOO:bar\r\nBEGIN:X-NESTED\r\nEND:X-NESTED\r\nEND:X-WEIRD\r\n";
        let text = wrap(&format!("{}{}", weird, GOOD_EVENT));

        let feed = parse_feed(&text, Taipei).unwrap();
        assert_eq!(titles(&feed), vec!["Still here"]);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn stray_lines_between_components_are_ignored() {
        let text = wrap(&format!(
            "X-WR-CALNAME:Club\r\nnonsense without a colon\r\nEND:VEVENT\r\n{}",
            GOOD_EVENT
        ));
        assert_eq!(titles(&parse_feed(&text, Taipei).unwrap()), vec!["Still here"]);
    }

    #[test]
    fn unterminated_event_is_dropped() {
        let cut = "BEGIN:VEVENT\r\nUID:cut@test\r\nDTSTART:20240310T020000Z\r\n";
        let text = wrap(&format!("{}{}", GOOD_EVENT, cut));

        let feed = parse_feed(&text, Taipei).unwrap();
        assert_eq!(titles(&feed), vec!["Still here"]);
        assert!(feed.get("cut@test").is_none());
    }

    #[test]
    fn folded_lines_stay_with_their_event() {
        let folded = concat!(
            "BEGIN:VEVENT\r\n",
            "UID:folded@test\r\n",
            "DTSTART:20240310T010000Z\r\n",
            "SUMMARY:Work\r\n",
            " shop\r\n",
            "END:VEVENT\r\n",
        );
        let feed = parse_feed(&wrap(folded), Taipei).unwrap();
        assert_eq!(titles(&feed), vec!["Workshop"]);
    }

    #[test]
    fn all_day_feed_event_does_not_reach_its_end_date() {
        let day = "BEGIN:VEVENT\r\n\
UID:day@test\r\n\
DTSTART;VALUE=DATE:20240310\r\n\
DTEND;VALUE=DATE:20240311\r\n\
SUMMARY:Open house\r\n\
END:VEVENT\r\n";
        let feed = parse_feed(&wrap(day), Taipei).unwrap();
        let event = feed.events().next().unwrap();

        let date = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        assert!(crate::today::occurs_on(event, date(10), Taipei));
        assert!(!crate::today::occurs_on(event, date(11), Taipei));
    }

    #[test]
    fn non_calendar_text_is_a_parse_error() {
        assert!(parse_feed("", Taipei).is_err());
        assert!(parse_feed("<html><body>502 Bad Gateway</body></html>", Taipei).is_err());
    }
}
