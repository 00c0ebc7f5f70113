/*
 * block.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The block record and the payloads used to create and change it.
//!
//! Blocks serialize with camelCase keys and a `type` field:
//!
//! ```json
//! {
//!   "id": "3f0c...",
//!   "type": "text",
//!   "props": { "content": "hi" },
//!   "render": { "kind": "html", "template": "<p>[[ content ]]</p>" },
//!   "visible": true,
//!   "locked": false,
//!   "metadata": { "createdAt": "...", "updatedAt": "...", "version": 1 }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Key/value record for `settings` and `props`. Values are primitives or null.
pub type PropMap = serde_json::Map<String, serde_json::Value>;

/// Key/value record for `style`. Values are strings or numbers.
pub type StyleMap = serde_json::Map<String, serde_json::Value>;

/// Opaque block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// A fresh UUID v4 identifier.
    pub fn generate() -> Self {
        BlockId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        BlockId(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        BlockId(id)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a block turns into output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderRecipe {
    /// A directive template rendered against the block's props.
    Html { template: String },

    /// A host component, identified by framework and name.
    Component {
        framework: String,
        name: String,
        #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
        props: PropMap,
    },

    /// Handed to an external adapter untouched.
    External {
        adapter: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl RenderRecipe {
    pub fn html(template: impl Into<String>) -> Self {
        RenderRecipe::Html {
            template: template.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RenderRecipe::Html { .. } => "html",
            RenderRecipe::Component { .. } => "component",
            RenderRecipe::External { .. } => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 1 + number of committed mutations.
    pub version: u64,
}

impl BlockMetadata {
    pub fn stamp(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn bump(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

fn default_visible() -> bool {
    true
}

/// A persisted block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub settings: PropMap,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderRecipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BlockId>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    pub metadata: BlockMetadata,
}

impl Block {
    /// Materialize a new record. Repositories call this from `create`.
    pub fn from_new(id: BlockId, new: NewBlock, now: DateTime<Utc>) -> Self {
        Block {
            id,
            block_type: new.block_type,
            settings: new.settings,
            props: new.props,
            style: new.style,
            order: new.order,
            render: new.render,
            parent: new.parent,
            visible: new.visible,
            locked: new.locked,
            metadata: BlockMetadata::stamp(now),
        }
    }

    /// Apply a change set and bump the version.
    ///
    /// `style` is merged key by key; every other provided field replaces the
    /// current value.
    pub fn apply(&mut self, changes: BlockChanges, now: DateTime<Utc>) {
        if let Some(settings) = changes.settings {
            self.settings = settings;
        }
        if let Some(props) = changes.props {
            self.props = props;
        }
        if let Some(style) = changes.style {
            self.style.get_or_insert_with(StyleMap::new).extend(style);
        }
        if let Some(order) = changes.order {
            self.order = Some(order);
        }
        if let Some(render) = changes.render {
            self.render = Some(render);
        }
        if let Some(visible) = changes.visible {
            self.visible = visible;
        }
        if let Some(locked) = changes.locked {
            self.locked = locked;
        }
        self.metadata.bump(now);
    }

    /// Creation payload for an unlocked copy of this block.
    pub fn to_copy(&self) -> NewBlock {
        NewBlock {
            block_type: self.block_type.clone(),
            settings: self.settings.clone(),
            props: self.props.clone(),
            style: self.style.clone(),
            order: self.order,
            render: self.render.clone(),
            parent: self.parent.clone(),
            visible: self.visible,
            locked: false,
        }
    }
}

/// Payload for creating a block. The repository assigns `id` and `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub settings: PropMap,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default)]
    pub style: Option<StyleMap>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub render: Option<RenderRecipe>,
    #[serde(default)]
    pub parent: Option<BlockId>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

impl NewBlock {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            settings: PropMap::new(),
            props: PropMap::new(),
            style: None,
            order: None,
            render: None,
            parent: None,
            visible: true,
            locked: false,
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = props;
        self
    }

    pub fn with_setting(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_render(mut self, render: RenderRecipe) -> Self {
        self.render = Some(render);
        self
    }

    pub fn with_parent(mut self, parent: BlockId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `type` and `parent` are fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockChanges {
    pub settings: Option<PropMap>,
    pub props: Option<PropMap>,
    pub style: Option<StyleMap>,
    pub order: Option<i64>,
    pub render: Option<RenderRecipe>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl BlockChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: PropMap) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn props(mut self, props: PropMap) -> Self {
        self.props = Some(props);
        self
    }

    pub fn style(mut self, style: StyleMap) -> Self {
        self.style = Some(style);
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn render(mut self, render: RenderRecipe) -> Self {
        self.render = Some(render);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
