//! Page components: typed, read-only views over part of a page.
//!
//! A component never mutates the page. Repeated structures (product cards,
//! cart lines) are read through a [`RecordExtractor`], which maps each
//! container element to one typed record in document order.
//!
//! # Example
//!
//! ```ignore
//! struct NameExtractor(Locator);
//!
//! #[async_trait]
//! impl RecordExtractor for NameExtractor {
//!     type Record = String;
//!
//!     fn container(&self) -> &Locator {
//!         &self.0
//!     }
//!
//!     async fn extract(&self, session: &PageSession, item: &ElementHandle) -> ProbeResult<String> {
//!         text_in(session, item, &Locator::new(".inventory_item_name")).await
//!     }
//! }
//! ```

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;
use async_trait::async_trait;

/// Maps each element matched by a container locator to a typed record
#[async_trait]
pub trait RecordExtractor: Send + Sync {
    /// Record produced per container
    type Record: Send;

    /// Locator matching one container per record
    fn container(&self) -> &Locator;

    /// Read one record from a resolved container
    async fn extract(
        &self,
        session: &PageSession,
        container: &ElementHandle,
    ) -> ProbeResult<Self::Record>;

    /// Name used in logs
    fn component_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Extract every record on the page, in document order.
///
/// Zero containers yields an empty list; the first failing record aborts.
pub async fn extract_records<E>(session: &PageSession, extractor: &E) -> ProbeResult<Vec<E::Record>>
where
    E: RecordExtractor + ?Sized,
{
    let containers = session.find_all(extractor.container()).await?;
    tracing::debug!(
        component = extractor.component_name(),
        count = containers.len(),
        "extracting records"
    );
    let mut records = Vec::with_capacity(containers.len());
    for container in &containers {
        records.push(extractor.extract(session, container).await?);
    }
    Ok(records)
}

/// Text of the unique element matched by `locator` inside `container`
pub async fn text_in(
    session: &PageSession,
    container: &ElementHandle,
    locator: &Locator,
) -> ProbeResult<String> {
    let element = session.find_in(container, locator).await?;
    session.text(&element).await
}

/// Required attribute of the element matched by `locator` inside `container`
pub async fn attribute_in(
    session: &PageSession,
    container: &ElementHandle,
    locator: &Locator,
    name: &str,
) -> ProbeResult<String> {
    let element = session.find_in(container, locator).await?;
    session
        .attribute(&element, name)
        .await?
        .ok_or_else(|| ProbeError::parse(name, locator.to_string(), "attribute missing"))
}

/// Text of an element that may legitimately be absent.
///
/// Absence is `None`, not an error; other failures still propagate.
pub async fn read_optional_text(
    session: &PageSession,
    locator: &Locator,
) -> ProbeResult<Option<String>> {
    let found = session.find_all(locator).await?;
    match found.first() {
        Some(element) => session.text(element).await.map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockStorefront};
    use crate::result::ErrorKind;

    struct NameExtractor {
        container: Locator,
        name: Locator,
    }

    impl NameExtractor {
        fn new() -> Self {
            Self {
                container: Locator::new(".inventory_item"),
                name: Locator::new(".inventory_item_name"),
            }
        }
    }

    #[async_trait]
    impl RecordExtractor for NameExtractor {
        type Record = String;

        fn container(&self) -> &Locator {
            &self.container
        }

        async fn extract(
            &self,
            session: &PageSession,
            container: &ElementHandle,
        ) -> ProbeResult<String> {
            text_in(session, container, &self.name).await
        }
    }

    struct MissingFieldExtractor(Locator);

    #[async_trait]
    impl RecordExtractor for MissingFieldExtractor {
        type Record = String;

        fn container(&self) -> &Locator {
            &self.0
        }

        async fn extract(
            &self,
            session: &PageSession,
            container: &ElementHandle,
        ) -> ProbeResult<String> {
            text_in(session, container, &Locator::new(".no_such_field")).await
        }
    }

    async fn inventory() -> PageSession {
        let session = PageSession::new(Box::new(MockStorefront::default()));
        mock::login_as_standard_user(&session).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_records_follow_document_order() {
        let session = inventory().await;
        let names = extract_records(&session, &NameExtractor::new()).await.unwrap();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "Sauce Labs Backpack");
        assert_eq!(names[4], "Sauce Labs Onesie");
    }

    #[tokio::test]
    async fn test_no_containers_is_empty_list() {
        let session = inventory().await;
        let extractor = MissingFieldExtractor(Locator::new(".cart_item_label"));
        assert!(extract_records(&session, &extractor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_record_aborts_extraction() {
        let session = inventory().await;
        let extractor = MissingFieldExtractor(Locator::new(".inventory_item"));
        let err = extract_records(&session, &extractor).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_optional_text() {
        let session = inventory().await;
        assert_eq!(
            read_optional_text(&session, &Locator::new(".shopping_cart_badge"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            read_optional_text(&session, &Locator::new(".title"))
                .await
                .unwrap()
                .as_deref(),
            Some("Products")
        );
    }

    #[tokio::test]
    async fn test_attribute_in_missing_attribute_is_parse_error() {
        let session = inventory().await;
        let card = session.find(&Locator::new(".inventory_item")).await.unwrap();
        let err = attribute_in(&session, &card, &Locator::new("img"), "srcset")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let src = attribute_in(&session, &card, &Locator::new("img"), "src")
            .await
            .unwrap();
        assert!(src.ends_with("sauce-backpack-1200x1500.jpg"));
    }
}
