//! Catalog of the content categories managed through the admin API.
//!
//! Every category follows the same list / create / update / delete pattern
//! and differs only in endpoint paths, the search parameter, the form
//! fields and the columns shown in listings.

use crate::utils::error::{AdminError, Result};

/// Uploads accepted by the API's file fields.
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "ppt"];

/// Suffixes of localized fields, in submission order.
pub const LOCALES: [&str; 3] = ["Uz", "Ru", "En"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Number,
    /// Integer rating between 1 and 5.
    Rating,
    /// Id of a record of the named resource.
    Reference(&'static str),
    /// List of ids of the named resource, submitted as a JSON array string.
    IdList(&'static str),
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub localized: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            localized: false,
        }
    }

    const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    const fn localized(self) -> Self {
        Self {
            localized: true,
            ..self
        }
    }

    pub fn is_upload(&self) -> bool {
        self.kind == FieldKind::Upload
    }
}

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Text)
}

const fn long_text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::LongText)
}

const fn upload(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Upload)
}

const fn reference(name: &'static str, label: &'static str, target: &'static str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Reference(target))
}

/// A concrete form key after localized fields are expanded
/// (`title` becomes `titleUz`, `titleRu`, `titleEn`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub spec: FieldSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: &'static str,
    /// Dotted path into the record, e.g. `travel.title`.
    pub field: &'static str,
}

const fn col(header: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec { header, field }
}

/// How an item endpoint is derived from the collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRoute {
    /// `{path}/{id}`
    Direct,
    /// `{path}/{segment}/{id}`, e.g. `/days/update/{id}`
    Nested(&'static str),
}

impl IdRoute {
    fn base(&self, path: &str) -> String {
        match self {
            IdRoute::Direct => path.to_string(),
            IdRoute::Nested(segment) => format!("{}/{}", path, segment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Multipart,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// Command-line name, e.g. `travel-designers`.
    pub name: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub search_param: &'static str,
    pub update_route: IdRoute,
    pub delete_route: IdRoute,
    pub encoding: BodyEncoding,
    pub fields: &'static [FieldSpec],
    pub columns: &'static [ColumnSpec],
    /// Statuses the API uses on create to report a duplicate.
    pub conflict_statuses: &'static [u16],
}

impl ResourceSpec {
    pub fn update_path(&self, id: &str) -> String {
        format!("{}/{}", self.update_route.base(self.path), id)
    }

    /// Collection path the delete mutation appends the id to.
    pub fn delete_base(&self) -> String {
        self.delete_route.base(self.path)
    }

    pub fn is_multipart(&self) -> bool {
        self.encoding == BodyEncoding::Multipart
    }

    pub fn form_fields(&self) -> Vec<FormField> {
        let mut expanded = Vec::new();
        for spec in self.fields {
            if spec.localized {
                for locale in LOCALES {
                    expanded.push(FormField {
                        key: format!("{}{}", spec.name, locale),
                        label: format!("{} ({})", spec.label, locale),
                        spec: *spec,
                    });
                }
            } else {
                expanded.push(FormField {
                    key: spec.name.to_string(),
                    label: spec.label.to_string(),
                    spec: *spec,
                });
            }
        }
        expanded
    }

    pub fn form_field(&self, key: &str) -> Option<FormField> {
        self.form_fields().into_iter().find(|f| f.key == key)
    }
}

const CONFLICT: &[u16] = &[409];

pub static RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        name: "levels",
        title: "Level",
        path: "/levels",
        search_param: "name",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Json,
        fields: &[text("name", "Level")],
        columns: &[col("Level", "name")],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "travel-types",
        title: "Travel type",
        path: "/travel-types",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[text("title", "Title").localized(), upload("image", "Image")],
        columns: &[
            col("Title (Uz)", "titleUz"),
            col("Title (Ru)", "titleRu"),
            col("Title (En)", "titleEn"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "travel-designers",
        title: "Travel designer",
        path: "/travel-designers",
        search_param: "name",
        update_route: IdRoute::Direct,
        delete_route: IdRoute::Direct,
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("name", "Name"),
            FieldSpec::new("email", "Email", FieldKind::Email),
            long_text("about", "About"),
            upload("file", "Photo"),
        ],
        columns: &[
            col("Name", "name"),
            col("Email", "email"),
            col("About", "about"),
            col("Photo", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "travels",
        title: "Travel",
        path: "/travels",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            long_text("description", "Description").localized(),
            FieldSpec::new("days", "Days", FieldKind::Number),
            FieldSpec::new("price", "Price", FieldKind::Number),
            reference("travelDesignerId", "Travel designer", "travel-designers"),
            reference("levelId", "Level", "levels"),
            reference("travelTypeId", "Travel type", "travel-types").optional(),
            FieldSpec::new("subTravelIds", "Sub travels", FieldKind::IdList("sub-travels"))
                .optional(),
            upload("file", "Image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Days", "days"),
            col("Price", "price"),
            col("Designer", "travelDesigner"),
            col("Level", "level.name"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "sub-travels",
        title: "Sub travel",
        path: "/subtravel",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            long_text("description", "Description").localized(),
            upload("image", "Image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Description", "descriptionUz"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "attractions",
        title: "Attraction",
        path: "/attractions",
        search_param: "title",
        update_route: IdRoute::Direct,
        delete_route: IdRoute::Direct,
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title"),
            long_text("text", "Text"),
            reference("travelId", "Travel", "travels"),
            upload("image", "Image"),
        ],
        columns: &[
            col("Title", "title"),
            col("Text", "text"),
            col("Travel", "travel"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "days",
        title: "Day",
        path: "/days",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title"),
            text("destination", "Region"),
            long_text("text", "Text"),
            reference("travelId", "Travel", "travels"),
            FieldSpec::new("lat", "Latitude", FieldKind::Number),
            FieldSpec::new("long", "Longitude", FieldKind::Number),
            upload("image", "Image"),
        ],
        columns: &[
            col("Title", "title"),
            col("Region", "destination"),
            col("Text", "text"),
            col("Travel", "travel"),
            col("Latitude", "lat"),
            col("Longitude", "long"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "services",
        title: "Service",
        path: "/services",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Json,
        fields: &[text("title", "Title"), reference("levelId", "Level", "levels")],
        columns: &[col("Title", "title"), col("Level", "level.name")],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "articles",
        title: "Article",
        path: "/articles",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[text("title", "Title").localized(), upload("images", "Image")],
        columns: &[
            col("Title (Uz)", "titleUz"),
            col("Title (Ru)", "titleRu"),
            col("Title (En)", "titleEn"),
            col("Image", "images"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "subarticles",
        title: "Sub article",
        path: "/subarticles",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title"),
            long_text("text", "Text"),
            reference("articleId", "Article", "articles"),
            upload("images", "Image"),
            upload("aboutImage", "About image"),
        ],
        columns: &[
            col("Title", "title"),
            col("Text", "text"),
            col("Article", "article"),
            col("Image", "images"),
            col("About image", "aboutImage"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "operators",
        title: "Operator",
        path: "/operators",
        search_param: "phone",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Json,
        fields: &[
            text("phone", "Phone"),
            FieldSpec::new("email", "Email", FieldKind::Email),
            text("workTime", "Working hours"),
        ],
        columns: &[
            col("Phone", "phone"),
            col("Email", "email"),
            col("Working hours", "workTime"),
        ],
        // operators report duplicates as 400
        conflict_statuses: &[400, 409],
    },
    ResourceSpec {
        name: "reviews",
        title: "Review",
        path: "/reviews",
        search_param: "userName",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("userName", "User name"),
            FieldSpec::new("rate", "Rating", FieldKind::Rating),
            long_text("text", "Text").localized(),
            upload("file", "Photo"),
        ],
        columns: &[
            col("User", "userName"),
            col("Rating", "rate"),
            col("Text", "textUz"),
            col("Photo", "images"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "travel-ideas",
        title: "Travel idea",
        path: "/travel-ideas",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            long_text("description", "Description").localized(),
            text("subTitle", "Subtitle").localized(),
            long_text("subDescription", "Sub description").localized(),
            reference("subTravelIdeasId", "Sub travel idea", "sub-travel-ideas"),
            upload("image", "Image"),
            upload("subImage", "Sub image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Subtitle", "subTitleUz"),
            col("Sub travel idea", "subTravelIdeas"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "sub-travel-ideas",
        title: "Sub travel idea",
        path: "/sub-travel-ideas",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            long_text("description", "Description").localized(),
            upload("image", "Image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Description", "descriptionUz"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "experiences",
        title: "Experience",
        path: "/exprens",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            // API field name is spelled `descreption`
            long_text("descreption", "Description").localized(),
            text("subTitle", "Subtitle").localized(),
            upload("image", "Image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Subtitle", "subTitleUz"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "categories",
        title: "Category",
        path: "/category",
        search_param: "title",
        update_route: IdRoute::Nested("update"),
        delete_route: IdRoute::Nested("delete"),
        encoding: BodyEncoding::Json,
        fields: &[
            text("title", "Title").localized(),
            long_text("description", "Description").localized(),
        ],
        columns: &[
            col("Title (Uz)", "titleUz"),
            col("Title (Ru)", "titleRu"),
            col("Title (En)", "titleEn"),
            col("Description", "descriptionUz"),
        ],
        conflict_statuses: CONFLICT,
    },
    ResourceSpec {
        name: "products",
        title: "Product",
        path: "/products",
        search_param: "title",
        update_route: IdRoute::Direct,
        delete_route: IdRoute::Direct,
        encoding: BodyEncoding::Multipart,
        fields: &[
            text("title", "Title").localized(),
            reference("categoryId", "Category", "categories"),
            upload("files", "Image"),
        ],
        columns: &[
            col("Title", "titleUz"),
            col("Category", "category"),
            col("Image", "image"),
        ],
        conflict_statuses: CONFLICT,
    },
];

/// Look a resource up by command name, or by its API path with or without
/// the leading slash.
pub fn find(name: &str) -> Result<&'static ResourceSpec> {
    let wanted = name.trim().trim_start_matches('/');
    RESOURCES
        .iter()
        .find(|r| r.name == wanted || r.path.trim_start_matches('/') == wanted)
        .ok_or_else(|| AdminError::UnknownResource {
            name: format!(
                "{} (available: {})",
                name,
                RESOURCES
                    .iter()
                    .map(|r| r.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}
