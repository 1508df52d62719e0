use crate::extract::{ExtractionError, Extractor};
use crate::output::{Field, RecordBuilder};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};

/// Minimum number of entries in the detail list
pub const MIN_DETAIL_ENTRIES: usize = 5;

/// Record fields filled positionally from the detail list
const DETAIL_FIELDS: [Field; MIN_DETAIL_ENTRIES] = [
    Field::Category,
    Field::Version,
    Field::Size,
    Field::LastUpdated,
    Field::Developer,
];

/// Extraction strategy for app-store style listing and detail pages
///
/// Listing pages mark each entry with a `div.app-icon` wrapping a link to the
/// detail page. Detail pages carry the title, a side bar of labelled details,
/// an icon block with the download link and icon image, an introduction, and
/// an optional screenshot gallery.
#[derive(Debug)]
pub struct AppPageExtractor {
    marker: Selector,
    anchor: Selector,
    title_block: Selector,
    heading: Selector,
    detail_list: Selector,
    detail_item: Selector,
    detail_label: Selector,
    detail_value: Selector,
    icon_block: Selector,
    paragraph: Selector,
    image: Selector,
    intro_block: Selector,
    nested_div: Selector,
    gallery: Selector,
}

impl AppPageExtractor {
    /// Compiles the selectors
    ///
    /// # Errors
    ///
    /// * `HarvestError::Selector` - A selector failed to parse
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            marker: compile("div.app-icon")?,
            anchor: compile("a")?,
            title_block: compile("div.content-categoryCtn-title")?,
            heading: compile("h1")?,
            detail_list: compile("ul.sideBar-appDetail")?,
            detail_item: compile("li")?,
            detail_label: compile("span")?,
            detail_value: compile("div")?,
            icon_block: compile("div.content-detailCtn-icon")?,
            paragraph: compile("p")?,
            image: compile("img")?,
            intro_block: compile("div.content-detailCtn-text")?,
            nested_div: compile("div > div")?,
            gallery: compile("div.slide-content")?,
        })
    }

    fn first<'a>(
        &self,
        scope: ElementRef<'a>,
        selector: &Selector,
        name: &'static str,
    ) -> Result<ElementRef<'a>, ExtractionError> {
        scope
            .select(selector)
            .next()
            .ok_or(ExtractionError::MissingElement(name))
    }

    fn find<'a>(
        &self,
        document: &'a Html,
        selector: &Selector,
        name: &'static str,
    ) -> Result<ElementRef<'a>, ExtractionError> {
        document
            .select(selector)
            .next()
            .ok_or(ExtractionError::MissingElement(name))
    }

    fn title(&self, document: &Html) -> Result<String, ExtractionError> {
        let block = self.find(document, &self.title_block, "title block")?;
        let heading = self.first(block, &self.heading, "title heading")?;
        Ok(text_of(heading))
    }

    /// (label, value) pairs from the side bar, in document order
    fn details(&self, document: &Html) -> Result<Vec<(String, String)>, ExtractionError> {
        let list = self.find(document, &self.detail_list, "detail list")?;

        list.select(&self.detail_item)
            .map(|item| -> Result<(String, String), ExtractionError> {
                let label = self.first(item, &self.detail_label, "detail label")?;
                let value = self.first(item, &self.detail_value, "detail value")?;
                Ok((text_of(label), text_of(value)))
            })
            .collect()
    }

    fn icon_links(&self, document: &Html) -> Result<(String, String), ExtractionError> {
        let block = self.find(document, &self.icon_block, "icon block")?;

        let download = self.first(block, &self.anchor, "download link")?;
        let download = attr_of(download, "href", "download link href")?;

        let paragraph = self.first(block, &self.paragraph, "icon paragraph")?;
        let image = self.first(paragraph, &self.image, "icon image")?;
        let image = attr_of(image, "src", "icon image src")?;

        Ok((download, image))
    }

    fn introduction(&self, document: &Html) -> Result<String, ExtractionError> {
        let block = self.find(document, &self.intro_block, "introduction block")?;
        let text = self.first(block, &self.nested_div, "introduction text")?;
        Ok(text_of(text))
    }

    /// Screenshot sources joined with `,`; an empty gallery gives ""
    fn gallery(&self, document: &Html) -> Result<String, ExtractionError> {
        let block = self.find(document, &self.gallery, "gallery")?;

        let sources = block
            .select(&self.nested_div)
            .map(|slide| {
                let image = self.first(slide, &self.image, "gallery image")?;
                attr_of(image, "src", "gallery image src")
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sources.join(","))
    }
}

impl Extractor for AppPageExtractor {
    fn harvest_links(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.marker)
            .filter_map(|marker| {
                let href = marker
                    .select(&self.anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"));
                if href.is_none() {
                    tracing::trace!("Listing marker without a link, skipping");
                }
                href.map(str::to_string)
            })
            .collect()
    }

    fn extract_record(&self, document: &Html) -> Result<RecordBuilder, ExtractionError> {
        let title = self.title(document)?;

        let details = self.details(document)?;
        if details.len() < MIN_DETAIL_ENTRIES {
            return Err(ExtractionError::TooFewDetails {
                expected: MIN_DETAIL_ENTRIES,
                found: details.len(),
            });
        }

        let (download_link, image_link) = self.icon_links(document)?;
        let introduction = self.introduction(document)?;
        let other_pics = self.gallery(document)?;

        let mut builder = RecordBuilder::new();
        builder
            .set(Field::Title, title)
            .set(Field::Introduction, introduction)
            .set(Field::DownloadLink, download_link)
            .set(Field::ImageLink, image_link)
            .set(Field::OtherPicsLink, other_pics);

        for (field, (label, value)) in DETAIL_FIELDS.into_iter().zip(details) {
            tracing::trace!("{} ({}) = {}", field, label, value);
            builder.set(field, value);
        }

        Ok(builder)
    }
}

fn compile(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn attr_of(
    element: ElementRef<'_>,
    attr: &str,
    name: &'static str,
) -> Result<String, ExtractionError> {
    element
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .ok_or(ExtractionError::MissingElement(name))
}
