//! Turns the HTML fragment of one timetable day into [`Lesson`] records.
//!
//! A day item looks like this on the site:
//!
//! ```html
//! <div class="n-timetable-day__item">
//!     <span class="n-timetable-day__from">08:00</span>
//!     <span class="n-timetable-day__to">09:30</span>
//!     <article class="n-timetable-card">
//!         <h3 class="n-timetable-card__title">Математика</h3>
//!         <div class="n-timetable-card__category">Лекция</div>
//!         <div class="n-timetable-card__affiliation">Иванов И.И.</div>
//!         <div class="n-timetable-card__geo">
//!             <div class="n-timetable-card__affiliation">Корпус A</div>
//!             <div class="n-timetable-card__address">ул. Ленина, 10</div>
//!         </div>
//!         <div class="n-timetable-card__auditorium">Ауд. 101</div>
//!     </article>
//! </div>
//! ```
//!
//! The time spans and the card are required: an item missing any of them is
//! skipped and the rest of the fragment is still extracted.
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

use super::{errors::TimetableError, models::lesson_model::Lesson};

const GEO_CLASS: &str = "n-timetable-card__geo";

struct LessonSelectors {
    item: Selector,
    from: Selector,
    to: Selector,
    card: Selector,
    title: Selector,
    category: Selector,
    affiliation: Selector,
    geo: Selector,
    address: Selector,
    auditorium: Selector,
}

fn selector(css: &str) -> Result<Selector, TimetableError> {
    Selector::parse(css).map_err(|e| TimetableError::Extraction(format!("{css}: {e}")))
}

impl LessonSelectors {
    fn new() -> Result<Self, TimetableError> {
        Ok(LessonSelectors {
            item: selector("div.n-timetable-day__item")?,
            from: selector("span.n-timetable-day__from")?,
            to: selector("span.n-timetable-day__to")?,
            card: selector("article.n-timetable-card")?,
            title: selector("h3.n-timetable-card__title")?,
            category: selector("div.n-timetable-card__category")?,
            affiliation: selector("div.n-timetable-card__affiliation")?,
            geo: selector(&format!("div.{GEO_CLASS}"))?,
            address: selector("div.n-timetable-card__address")?,
            auditorium: selector("div.n-timetable-card__auditorium")?,
        })
    }
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

/// Whether `element` sits in a geo block of `card`; ancestors above the card are not looked at.
fn inside_geo(element: &ElementRef, card: &ElementRef) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != card.id())
        .any(|node| {
            node.value()
                .as_element()
                .is_some_and(|e| e.classes().any(|class| class == GEO_CLASS))
        })
}

/// Builds one lesson from a day item, or `None` when a required part is missing.
fn extract_item(item: ElementRef, selectors: &LessonSelectors, date: &str) -> Option<Lesson> {
    let from = first_text(item, &selectors.from)?;
    let to = first_text(item, &selectors.to)?;
    let card = item.select(&selectors.card).next()?;

    // The building shares the affiliation class, so the teacher is the first one outside the geo block.
    let teacher = card
        .select(&selectors.affiliation)
        .find(|affiliation| !inside_geo(affiliation, &card))
        .map(text_of)
        .unwrap_or_default();

    let geo = card.select(&selectors.geo).next();
    let building = geo
        .and_then(|geo| first_text(geo, &selectors.affiliation))
        .unwrap_or_default();
    let address = geo
        .and_then(|geo| first_text(geo, &selectors.address))
        .unwrap_or_default();

    Some(Lesson {
        date: date.to_owned(),
        time: format!("{} - {}", from, to),
        subject: first_text(card, &selectors.title).unwrap_or_default(),
        category: first_text(card, &selectors.category).unwrap_or_default(),
        teacher,
        building,
        address,
        auditorium: first_text(card, &selectors.auditorium).unwrap_or_default(),
    })
}

/// Extracts lessons of `date` from `html` in document order.
pub fn extract(html: &str, date: &str) -> Result<Vec<Lesson>, TimetableError> {
    let selectors = LessonSelectors::new()?;
    let fragment = Html::parse_fragment(html);

    let mut lessons = Vec::new();
    for (index, item) in fragment.select(&selectors.item).enumerate() {
        match extract_item(item, &selectors, date) {
            Some(lesson) => lessons.push(lesson),
            None => warn!(
                "Skipping item #{} of {}: no start time, end time or card",
                index, date
            ),
        }
    }
    debug!("Extracted {} lessons for {}", lessons.len(), date);
    Ok(lessons)
}
