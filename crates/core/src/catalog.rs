use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::model::{Course, CourseDraft, CourseError, CourseId, CourseSummary};

/// Courses shipped with the binary, in registration order.
const BUILTIN_COURSES: [(&str, &str); 6] = [
    (
        "financial-literacy",
        include_str!("../content/financial-literacy.json"),
    ),
    (
        "emotional-intelligence",
        include_str!("../content/emotional-intelligence.json"),
    ),
    (
        "career-planning",
        include_str!("../content/career-planning.json"),
    ),
    ("relationships", include_str!("../content/relationships.json")),
    (
        "health-wellness",
        include_str!("../content/health-wellness.json"),
    ),
    ("study-skills", include_str!("../content/study-skills.json")),
];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to parse course document {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid course {id}: {source}")]
    Course {
        id: String,
        #[source]
        source: CourseError,
    },

    #[error("course {id} is registered more than once")]
    DuplicateId { id: CourseId },
}

/// Immutable, ordered set of courses built once at startup.
///
/// Courses are shared behind `Arc` so sessions can hold one without
/// borrowing the catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Arc<Course>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from validated courses, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two courses share an id.
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for course in courses {
            let key = course.id().as_str().to_owned();
            if catalog.index.contains_key(&key) {
                return Err(CatalogError::DuplicateId {
                    id: course.id().clone(),
                });
            }
            catalog.index.insert(key, catalog.courses.len());
            catalog.courses.push(Arc::new(course));
        }
        Ok(catalog)
    }

    /// Parse and validate named JSON course documents.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for the first document that fails to parse or
    /// validate, or for a duplicate id.
    pub fn from_json_documents<'a>(
        documents: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CatalogError> {
        let courses = documents
            .into_iter()
            .map(|(name, json)| {
                let draft: CourseDraft =
                    serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                        source_name: name.to_owned(),
                        source,
                    })?;
                let id = draft.id.clone();
                draft
                    .validate()
                    .map_err(|source| CatalogError::Course { id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_courses(courses)
    }

    /// The bundled course catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded content is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_documents(BUILTIN_COURSES)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Course>> {
        self.index.get(id).map(|&i| &self.courses[i])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Course ids in registration order.
    #[must_use]
    pub fn course_ids(&self) -> Vec<&CourseId> {
        self.courses.iter().map(|c| c.id()).collect()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<CourseSummary> {
        self.courses.iter().map(|c| c.summary()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::course;
    use crate::model::{ContentBlock, LessonId};

    #[test]
    fn builtin_catalog_loads_in_registration_order() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<&str> = catalog.course_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "financial-literacy",
                "emotional-intelligence",
                "career-planning",
                "relationships",
                "health-wellness",
                "study-skills",
            ]
        );
    }

    #[test]
    fn builtin_courses_have_lessons_and_quizzes() {
        let catalog = Catalog::builtin().unwrap();
        for course in catalog.courses() {
            assert!(course.lesson_count() >= 6, "{}", course.id());
            assert_eq!(course.quiz_questions().len(), 12, "{}", course.id());
        }
        let finance = catalog.get("financial-literacy").unwrap();
        assert_eq!(finance.lesson_count(), 8);
        assert!(finance.instructor().bio.is_some());
    }

    #[test]
    fn builtin_content_uses_every_block_kind() {
        let catalog = Catalog::builtin().unwrap();
        let mut kinds: Vec<&str> = catalog
            .courses()
            .flat_map(|c| c.lessons().iter())
            .flat_map(|l| l.content.iter())
            .map(ContentBlock::kind)
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 6);
    }

    #[test]
    fn unknown_id_is_absent() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get("underwater-basket-weaving").is_none());
        assert!(!catalog.contains(""));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_courses([course("dup", 1, 0), course("dup", 2, 0)]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { .. }));
    }

    #[test]
    fn malformed_document_names_its_source() {
        let err = Catalog::from_json_documents([("broken", "{ not json")]).unwrap_err();
        match err {
            CatalogError::Parse { source_name, .. } => assert_eq!(source_name, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_course_in_document_is_reported() {
        let json = r#"{
            "id": "gaps",
            "title": "Gaps",
            "description": "",
            "level": "Beginner",
            "total_duration": "1 hour",
            "instructor": { "name": "A", "title": "B" },
            "lessons": [
                { "id": 1, "title": "One", "duration": "5 min", "content": [] },
                { "id": 3, "title": "Three", "duration": "5 min", "content": [] }
            ]
        }"#;
        let err = Catalog::from_json_documents([("gaps.json", json)]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Course {
                source: CourseError::LessonOutOfSequence { found: 3, .. },
                ..
            }
        ));
    }

    #[test]
    fn summaries_follow_catalog_order() {
        let catalog = Catalog::from_courses([course("b", 2, 1), course("a", 3, 0)]).unwrap();
        let summaries = catalog.summaries();
        assert_eq!(summaries[0].id.as_str(), "b");
        assert_eq!(summaries[1].total_lessons, 3);
        assert!(catalog.get("a").unwrap().has_lesson(LessonId::new(3)));
    }
}
