//! Lineage Core Types and Definitions
//!
//! This crate provides the foundational types shared by the lineage crates:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Ranks**: Integer-indexable positions on the rank axis ([`rank::Rank`], [`rank::Semester`])
//! - **Entities**: Tree nodes and their parent keys ([`entity::Entity`])
//! - **Relationships**: Explicit directed edges ([`relationship::Relationship`])
//! - **Members**: Typed roster records produced by the parser ([`member::Member`])
//! - **Colors**: CSS color handling for styling ([`color::Color`])

pub mod color;
pub mod entity;
pub mod identifier;
pub mod member;
pub mod rank;
pub mod relationship;
