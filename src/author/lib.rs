use std::collections::HashMap;

use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::book::{self, Book};
use crate::config::Relations;
use crate::db::{Database, parse_object_id};
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(rename = "yearOfBirth", skip_serializing_if = "Option::is_none")]
    pub year_of_birth: Option<i32>,
    #[serde(default)]
    pub books: Vec<String>,
}

/// An author with its `books` references expanded into full records.
/// References that no longer resolve to a stored book are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedAuthor {
    pub id: String,
    pub name: String,
    #[serde(rename = "yearOfBirth", skip_serializing_if = "Option::is_none")]
    pub year_of_birth: Option<i32>,
    pub books: Vec<Book>,
}

/// Creation never touches the `books` list; it always starts empty and is
/// maintained by callers afterwards (or by the `link_both_sides` mode).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAuthor {
    pub name: Option<String>,
    #[serde(rename = "yearOfBirth")]
    pub year_of_birth: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthor {
    pub name: Option<String>,
    #[serde(rename = "yearOfBirth")]
    pub year_of_birth: Option<i32>,
    pub books: Option<Vec<String>>,
}

pub(crate) fn document_to_author(doc: &Document) -> Result<Author, StoreError> {
    let year_of_birth = match doc.get("yearOfBirth") {
        Some(Bson::Int32(v)) => Some(*v),
        Some(Bson::Int64(v)) => Some(*v as i32),
        _ => None,
    };

    let books = match doc.get_array("books") {
        Ok(values) => values
            .iter()
            .filter_map(|v| v.as_object_id().map(|oid| oid.to_hex()))
            .collect(),
        Err(_) => Vec::new(),
    };

    Ok(Author {
        id: doc.get_object_id("_id")?.to_hex(),
        name: doc.get_str("name")?.to_owned(),
        year_of_birth,
        books,
    })
}

fn build_author_document(input: &CreateAuthor, id: ObjectId) -> Result<Document, StoreError> {
    let name = match &input.name {
        Some(n) if !n.trim().is_empty() => n.clone(),
        _ => return Err(StoreError::Validation("name is required".to_string())),
    };

    let mut doc = doc! { "_id": id, "name": name, "books": [] };
    if let Some(year) = input.year_of_birth {
        doc.insert("yearOfBirth", year);
    }

    Ok(doc)
}

fn build_author_update(input: &UpdateAuthor) -> Result<Document, StoreError> {
    let mut set = Document::new();
    if let Some(name) = &input.name {
        set.insert("name", name.clone());
    }
    if let Some(year) = input.year_of_birth {
        set.insert("yearOfBirth", year);
    }
    if let Some(books) = &input.books {
        let ids = books
            .iter()
            .map(|id| parse_object_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        set.insert("books", ids);
    }
    Ok(set)
}

/// Substitutes fetched book records for the author's reference list,
/// keeping the list's order and dropping ids that fetched nothing.
fn populate(author: Author, fetched: Vec<Book>) -> PopulatedAuthor {
    let mut by_id: HashMap<String, Book> = fetched
        .into_iter()
        .map(|book| (book.id.clone(), book))
        .collect();

    let books = author
        .books
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    PopulatedAuthor {
        id: author.id,
        name: author.name,
        year_of_birth: author.year_of_birth,
        books,
    }
}

pub struct Authors<'a> {
    db: &'a Database,
    relations: Relations,
}

impl<'a> Authors<'a> {
    pub fn new(db: &'a Database, relations: Relations) -> Self {
        Self { db, relations }
    }

    pub async fn create(&self, input: CreateAuthor) -> Result<Author, StoreError> {
        let doc = build_author_document(&input, ObjectId::new())?;
        self.db.authors().insert_one(&doc).await?;
        document_to_author(&doc)
    }

    pub async fn list(&self) -> Result<Vec<Author>, StoreError> {
        let cursor = self.db.authors().find(doc! {}).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        docs.iter().map(document_to_author).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<PopulatedAuthor>, StoreError> {
        let oid = parse_object_id(id)?;
        let doc = match self.db.authors().find_one(doc! { "_id": oid }).await? {
            Some(doc) => doc,
            None => return Ok(None),
        };
        let author = document_to_author(&doc)?;

        let ids: Vec<ObjectId> = author
            .books
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();

        let fetched = if ids.is_empty() {
            Vec::new()
        } else {
            let cursor = self
                .db
                .books()
                .find(doc! { "_id": { "$in": ids } })
                .await?;
            let docs: Vec<Document> = cursor.try_collect().await?;
            docs.iter()
                .map(book::document_to_book)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Some(populate(author, fetched)))
    }

    pub async fn update(&self, id: &str, input: UpdateAuthor) -> Result<(), StoreError> {
        let oid = parse_object_id(id)?;

        // Fetch first so a missing id surfaces before any merge is attempted.
        if self
            .db
            .authors()
            .find_one(doc! { "_id": oid })
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound(format!("no author with id {}", id)));
        }

        let set = build_author_update(&input)?;
        if set.is_empty() {
            return Ok(());
        }

        self.db
            .authors()
            .update_one(doc! { "_id": oid }, doc! { "$set": set })
            .await?;
        Ok(())
    }

    /// Two-step cascade: de-reference every book that points at the author,
    /// then remove the author record. Sequential and non-atomic by default;
    /// `relations.transactional_cascade` wraps both steps in a session
    /// transaction (replica-set deployments only).
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_object_id(id)?;

        if self.relations.transactional_cascade {
            let mut session = self.db.client().start_session().await?;
            session.start_transaction().await?;

            self.db
                .books()
                .update_many(
                    doc! { "author": oid },
                    doc! { "$set": { "author": Bson::Null } },
                )
                .session(&mut session)
                .await?;
            let result = self
                .db
                .authors()
                .delete_one(doc! { "_id": oid })
                .session(&mut session)
                .await?;

            if result.deleted_count == 0 {
                session.abort_transaction().await?;
                return Err(StoreError::NotFound(format!("no author with id {}", id)));
            }
            session.commit_transaction().await?;
            return Ok(());
        }

        self.db
            .books()
            .update_many(
                doc! { "author": oid },
                doc! { "$set": { "author": Bson::Null } },
            )
            .await?;
        let result = self.db.authors().delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound(format!("no author with id {}", id)));
        }

        Ok(())
    }
}
