//! The declared resource types of the website.

use crate::asset::AssetFolder;
use crate::resource::{
    FieldDef, FieldDefault, FilterDef, KeyDef, OrderDef, RelationDef, ResourceDefinition,
    ResourceError,
};

/// Academic departments.
pub static DEPARTMENT: ResourceDefinition = ResourceDefinition {
    name: "Department",
    table: "departments",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("name", "name").required(),
        FieldDef::text("code", "code"),
        FieldDef::text("description", "description"),
    ],
    relations: &[],
    order: &[OrderDef::asc("name")],
    filters: &[FilterDef::on("code")],
    folder: None,
};

/// Faculty members, keyed by a readable slug.
pub static FACULTY: ResourceDefinition = ResourceDefinition {
    name: "Faculty",
    table: "faculty",
    key: KeyDef::TEXT,
    fields: &[
        FieldDef::text("name", "name").required(),
        FieldDef::text("designation", "designation").required(),
        FieldDef::text("email", "email"),
        FieldDef::text("phone", "phone"),
        FieldDef::text("bio", "bio"),
        FieldDef::asset("imageUrl", "image_url"),
        FieldDef::integer("departmentId", "department_id"),
        FieldDef::flag("isHead", "is_head", false),
    ],
    relations: &[RelationDef {
        name: "department",
        field: "departmentId",
        target: &DEPARTMENT,
        projection: &["id", "name"],
    }],
    order: &[OrderDef::asc("name")],
    filters: &[
        FilterDef::on("departmentId"),
        FilterDef::on("designation"),
        FilterDef::on("isHead"),
    ],
    folder: Some(AssetFolder::Faculty),
};

/// Degree programs.
pub static PROGRAM: ResourceDefinition = ResourceDefinition {
    name: "Program",
    table: "programs",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("name", "name").required(),
        FieldDef::text("level", "level").required(),
        FieldDef::integer("durationYears", "duration_years"),
        FieldDef::text("description", "description"),
        FieldDef::integer("departmentId", "department_id").required(),
        FieldDef::asset("brochureUrl", "brochure_url"),
    ],
    relations: &[RelationDef {
        name: "department",
        field: "departmentId",
        target: &DEPARTMENT,
        projection: &["id", "name", "code"],
    }],
    order: &[OrderDef::asc("name")],
    filters: &[FilterDef::on("departmentId"), FilterDef::on("level")],
    folder: Some(AssetFolder::Programs),
};

/// News items.
pub static NEWS: ResourceDefinition = ResourceDefinition {
    name: "News",
    table: "news",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("title", "title").required(),
        FieldDef::text("body", "body").required(),
        FieldDef::asset("imageUrl", "image_url"),
        FieldDef::flag("highlighted", "highlighted", false),
        FieldDef::timestamp("publishedAt", "published_at").with_default(FieldDefault::Now),
    ],
    relations: &[],
    order: &[OrderDef::desc("publishedAt")],
    filters: &[FilterDef::on("highlighted")],
    folder: Some(AssetFolder::News),
};

/// Campus events.
pub static EVENT: ResourceDefinition = ResourceDefinition {
    name: "Event",
    table: "events",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("title", "title").required(),
        FieldDef::text("description", "description"),
        FieldDef::text("venue", "venue"),
        FieldDef::timestamp("startsAt", "starts_at").required(),
        FieldDef::timestamp("endsAt", "ends_at"),
        FieldDef::asset("imageUrl", "image_url"),
        FieldDef::text("societyId", "society_id"),
    ],
    relations: &[RelationDef {
        name: "society",
        field: "societyId",
        target: &SOCIETY,
        projection: &["id", "name"],
    }],
    order: &[OrderDef::desc("startsAt")],
    filters: &[FilterDef::on("societyId")],
    folder: Some(AssetFolder::Events),
};

/// Student societies.
pub static SOCIETY: ResourceDefinition = ResourceDefinition {
    name: "Society",
    table: "societies",
    key: KeyDef::TEXT,
    fields: &[
        FieldDef::text("name", "name").required(),
        FieldDef::text("description", "description"),
        FieldDef::asset("logoUrl", "logo_url"),
        FieldDef::text("facultyAdvisorId", "faculty_advisor_id"),
    ],
    relations: &[RelationDef {
        name: "facultyAdvisor",
        field: "facultyAdvisorId",
        target: &FACULTY,
        projection: &["id", "name", "email"],
    }],
    order: &[OrderDef::asc("name")],
    filters: &[],
    folder: Some(AssetFolder::Societies),
};

/// Research publications.
pub static PUBLICATION: ResourceDefinition = ResourceDefinition {
    name: "Publication",
    table: "publications",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("title", "title").required(),
        FieldDef::text("authors", "authors").required(),
        FieldDef::text("venue", "venue"),
        FieldDef::integer("year", "year").required(),
        FieldDef::integer("sequence", "sequence"),
        FieldDef::text("facultyId", "faculty_id"),
        FieldDef::asset("documentUrl", "document_url"),
    ],
    relations: &[RelationDef {
        name: "faculty",
        field: "facultyId",
        target: &FACULTY,
        projection: &["id", "name"],
    }],
    order: &[OrderDef::desc("year"), OrderDef::asc("sequence")],
    filters: &[FilterDef::on("year"), FilterDef::on("facultyId")],
    folder: Some(AssetFolder::Documents),
};

/// Official notices.
pub static NOTICE: ResourceDefinition = ResourceDefinition {
    name: "Notice",
    table: "notices",
    key: KeyDef::INTEGER,
    fields: &[
        FieldDef::text("title", "title").required(),
        FieldDef::date("noticeDate", "notice_date").required(),
        FieldDef::asset("documentUrl", "document_url"),
        FieldDef::flag("pinned", "pinned", false),
    ],
    relations: &[],
    order: &[OrderDef::desc("noticeDate")],
    filters: &[FilterDef::on("pinned")],
    folder: Some(AssetFolder::Documents),
};

static ALL: [&ResourceDefinition; 8] = [
    &DEPARTMENT,
    &FACULTY,
    &PROGRAM,
    &NEWS,
    &EVENT,
    &SOCIETY,
    &PUBLICATION,
    &NOTICE,
];

/// Every declared resource type.
#[must_use]
pub fn all() -> &'static [&'static ResourceDefinition] {
    &ALL
}

/// Find a resource type by route name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static ResourceDefinition> {
    ALL.iter()
        .copied()
        .find(|def| def.name.eq_ignore_ascii_case(name))
}

/// Like [`find`], but an unknown name is an error.
///
/// # Errors
///
/// Returns [`ResourceError::UnknownResource`] if no type has the name.
pub fn lookup(name: &str) -> Result<&'static ResourceDefinition, ResourceError> {
    find(name).ok_or_else(|| ResourceError::UnknownResource(name.to_string()))
}
