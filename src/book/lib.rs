use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::config::Relations;
use crate::db::{Database, parse_object_id};
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(rename = "publishedDate", skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    pub name: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub author: Option<String>,
}

/// Partial-field merge input. Absent fields are left untouched; a field
/// sent as JSON null is indistinguishable from an absent one and is
/// likewise left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub name: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub author: Option<String>,
}

pub(crate) fn document_to_book(doc: &Document) -> Result<Book, StoreError> {
    let author = match doc.get("author") {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        _ => None,
    };

    let genres = match doc.get_array("genres") {
        Ok(values) => values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        Err(_) => Vec::new(),
    };

    Ok(Book {
        id: doc.get_object_id("_id")?.to_hex(),
        name: doc.get_str("name")?.to_owned(),
        published_date: doc.get_str("publishedDate").ok().map(str::to_owned),
        genres,
        author,
    })
}

fn build_book_document(input: &CreateBook, id: ObjectId) -> Result<Document, StoreError> {
    let name = match &input.name {
        Some(n) if !n.trim().is_empty() => n.clone(),
        _ => return Err(StoreError::Validation("name is required".to_string())),
    };

    let mut doc = doc! {
        "_id": id,
        "name": name,
        "genres": input.genres.clone().unwrap_or_default(),
    };
    if let Some(published_date) = &input.published_date {
        doc.insert("publishedDate", published_date.clone());
    }
    match &input.author {
        Some(author) => doc.insert("author", parse_object_id(author)?),
        None => doc.insert("author", Bson::Null),
    };

    Ok(doc)
}

fn build_book_update(input: &UpdateBook) -> Result<Document, StoreError> {
    let mut set = Document::new();
    if let Some(name) = &input.name {
        set.insert("name", name.clone());
    }
    if let Some(published_date) = &input.published_date {
        set.insert("publishedDate", published_date.clone());
    }
    if let Some(genres) = &input.genres {
        set.insert("genres", genres.clone());
    }
    if let Some(author) = &input.author {
        set.insert("author", parse_object_id(author)?);
    }
    Ok(set)
}

pub struct Books<'a> {
    db: &'a Database,
    relations: Relations,
}

impl<'a> Books<'a> {
    pub fn new(db: &'a Database, relations: Relations) -> Self {
        Self { db, relations }
    }

    pub async fn create(&self, input: CreateBook) -> Result<Book, StoreError> {
        let doc = build_book_document(&input, ObjectId::new())?;
        self.db.books().insert_one(&doc).await?;

        if self.relations.link_both_sides {
            if let Some(Bson::ObjectId(author_id)) = doc.get("author") {
                let book_id = doc.get_object_id("_id")?;
                self.db
                    .authors()
                    .update_one(
                        doc! { "_id": *author_id },
                        doc! { "$push": { "books": book_id } },
                    )
                    .await?;
            }
        }

        document_to_book(&doc)
    }

    pub async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let cursor = self.db.books().find(doc! {}).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        docs.iter().map(document_to_book).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let oid = parse_object_id(id)?;
        match self.db.books().find_one(doc! { "_id": oid }).await? {
            Some(doc) => Ok(Some(document_to_book(&doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, id: &str, input: UpdateBook) -> Result<(), StoreError> {
        let oid = parse_object_id(id)?;
        let set = build_book_update(&input)?;

        // When the author reference is being re-pointed and both sides of
        // the relationship are maintained, the old author has to be known
        // before the merge overwrites it.
        let previous_author = if self.relations.link_both_sides && set.contains_key("author") {
            let existing = self
                .db
                .books()
                .find_one(doc! { "_id": oid })
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("no book with id {}", id)))?;
            match existing.get("author") {
                Some(Bson::ObjectId(a)) => Some(*a),
                _ => None,
            }
        } else {
            None
        };

        if set.is_empty() {
            if self.db.books().find_one(doc! { "_id": oid }).await?.is_none() {
                return Err(StoreError::NotFound(format!("no book with id {}", id)));
            }
            return Ok(());
        }

        let result = self
            .db
            .books()
            .update_one(doc! { "_id": oid }, doc! { "$set": set.clone() })
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(format!("no book with id {}", id)));
        }

        if self.relations.link_both_sides {
            if let Some(Bson::ObjectId(new_author)) = set.get("author") {
                let new_author = *new_author;
                if previous_author != Some(new_author) {
                    if let Some(old_author) = previous_author {
                        self.db
                            .authors()
                            .update_one(
                                doc! { "_id": old_author },
                                doc! { "$pull": { "books": oid } },
                            )
                            .await?;
                    }
                    self.db
                        .authors()
                        .update_one(
                            doc! { "_id": new_author },
                            doc! { "$push": { "books": oid } },
                        )
                        .await?;
                }
            }
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_object_id(id)?;

        let author_to_unlink = if self.relations.link_both_sides {
            self.db
                .books()
                .find_one(doc! { "_id": oid })
                .await?
                .and_then(|existing| match existing.get("author") {
                    Some(Bson::ObjectId(a)) => Some(*a),
                    _ => None,
                })
        } else {
            None
        };

        let result = self.db.books().delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound(format!("no book with id {}", id)));
        }

        if let Some(author_id) = author_to_unlink {
            self.db
                .authors()
                .update_one(
                    doc! { "_id": author_id },
                    doc! { "$pull": { "books": oid } },
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_to_book_full() {
        let id = ObjectId::new();
        let author = ObjectId::new();
        let doc = doc! {
            "_id": id,
            "name": "The Hobbit",
            "publishedDate": "1937-09-21",
            "genres": ["fantasy", "adventure"],
            "author": author,
        };

        let book = document_to_book(&doc).unwrap();
        assert_eq!(book.id, id.to_hex());
        assert_eq!(book.name, "The Hobbit");
        assert_eq!(book.published_date.as_deref(), Some("1937-09-21"));
        assert_eq!(book.genres, vec!["fantasy", "adventure"]);
        assert_eq!(book.author, Some(author.to_hex()));
    }

    #[test]
    fn test_document_to_book_minimal() {
        let doc = doc! { "_id": ObjectId::new(), "name": "Untitled" };
        let book = document_to_book(&doc).unwrap();
        assert_eq!(book.name, "Untitled");
        assert!(book.published_date.is_none());
        assert!(book.genres.is_empty());
        assert!(book.author.is_none());
    }

    #[test]
    fn test_document_to_book_null_author() {
        // shape left behind by the author-delete cascade
        let doc = doc! { "_id": ObjectId::new(), "name": "Orphaned", "author": Bson::Null };
        let book = document_to_book(&doc).unwrap();
        assert!(book.author.is_none());
    }

    #[test]
    fn test_create_requires_name() {
        let err = build_book_document(&CreateBook::default(), ObjectId::new()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let input = CreateBook {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        let err = build_book_document(&input, ObjectId::new()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_create_document_defaults() {
        let input = CreateBook {
            name: Some("The Hobbit".to_string()),
            ..Default::default()
        };
        let doc = build_book_document(&input, ObjectId::new()).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "The Hobbit");
        assert!(doc.get_array("genres").unwrap().is_empty());
        assert_eq!(doc.get("author"), Some(&Bson::Null));
        assert!(doc.get("publishedDate").is_none());
    }

    #[test]
    fn test_create_rejects_malformed_author_id() {
        let input = CreateBook {
            name: Some("The Hobbit".to_string()),
            author: Some("tolkien".to_string()),
            ..Default::default()
        };
        let err = build_book_document(&input, ObjectId::new()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[test]
    fn test_update_sets_only_supplied_fields() {
        let input = UpdateBook {
            published_date: Some("1954-07-29".to_string()),
            ..Default::default()
        };
        let set = build_book_update(&input).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("publishedDate").unwrap(), "1954-07-29");
    }

    #[test]
    fn test_update_with_no_fields_is_empty() {
        let set = build_book_update(&UpdateBook::default()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_update_parses_author_reference() {
        let author = ObjectId::new();
        let input = UpdateBook {
            author: Some(author.to_hex()),
            ..Default::default()
        };
        let set = build_book_update(&input).unwrap();
        assert_eq!(set.get_object_id("author").unwrap(), author);

        let input = UpdateBook {
            author: Some("bad-id".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_book_update(&input).unwrap_err(),
            StoreError::InvalidId(_)
        ));
    }
}
