// src/event/entity.rs

//! Typed description of the inventory entities that produce activity.
//!
//! Each variant knows how to render its own notification text and which account and
//! model ids it belongs to. Call sites resolve this once, before the event is built,
//! so the pipeline itself never inspects model names.

use super::activity::{ActivityType, EntityDescriptor};
use super::AccountId;

/// Rendered summary of an entity activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDescription {
  /// Human-readable notification text, e.g. `created stock item "Bolts M8"`.
  pub text: String,
  /// Model name/id (and sub-model, if any) the activity touched.
  pub entity: EntityDescriptor,
  /// The account the entity belongs to.
  pub account_id: AccountId,
}

/// The closed set of entity kinds that emit activity events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityActivity {
  Stock {
    account_id: AccountId,
    stock_id: String,
    name: String,
  },
  Category {
    account_id: AccountId,
    category_id: String,
    name: String,
  },
  Unit {
    account_id: AccountId,
    unit_id: String,
    name: String,
  },
  Composite {
    account_id: AccountId,
    composite_id: String,
    name: String,
    component_count: usize,
  },
  /// Attachments live under a stock item, so they carry it as the parent model.
  Attachment {
    account_id: AccountId,
    stock_id: String,
    attachment_id: String,
    file_name: String,
  },
  Warehouse {
    account_id: AccountId,
    warehouse_id: String,
    name: String,
  },
}

impl EntityActivity {
  /// Model name as stored in the audit record.
  pub fn model_name(&self) -> &'static str {
    match self {
      EntityActivity::Stock { .. } => "stock",
      EntityActivity::Category { .. } => "category",
      EntityActivity::Unit { .. } => "unit",
      EntityActivity::Composite { .. } => "composite",
      EntityActivity::Attachment { .. } => "stock",
      EntityActivity::Warehouse { .. } => "warehouse",
    }
  }

  pub fn account_id(&self) -> &str {
    match self {
      EntityActivity::Stock { account_id, .. }
      | EntityActivity::Category { account_id, .. }
      | EntityActivity::Unit { account_id, .. }
      | EntityActivity::Composite { account_id, .. }
      | EntityActivity::Attachment { account_id, .. }
      | EntityActivity::Warehouse { account_id, .. } => account_id,
    }
  }

  /// Renders notification text and resolves the model and account ids.
  pub fn describe_activity(&self, activity_type: ActivityType) -> ActivityDescription {
    let verb = activity_type.verb();
    let (text, entity) = match self {
      EntityActivity::Stock { stock_id, name, .. } => (
        format!("{} stock item \"{}\"", verb, name),
        EntityDescriptor::new(self.model_name(), stock_id.clone()),
      ),
      EntityActivity::Category {
        category_id, name, ..
      } => (
        format!("{} category \"{}\"", verb, name),
        EntityDescriptor::new(self.model_name(), category_id.clone()),
      ),
      EntityActivity::Unit { unit_id, name, .. } => (
        format!("{} unit \"{}\"", verb, name),
        EntityDescriptor::new(self.model_name(), unit_id.clone()),
      ),
      EntityActivity::Composite {
        composite_id,
        name,
        component_count,
        ..
      } => (
        format!(
          "{} composite \"{}\" ({} components)",
          verb, name, component_count
        ),
        EntityDescriptor::new(self.model_name(), composite_id.clone()),
      ),
      EntityActivity::Attachment {
        stock_id,
        attachment_id,
        file_name,
        ..
      } => (
        format!("{} attachment \"{}\" on stock item {}", verb, file_name, stock_id),
        EntityDescriptor::new(self.model_name(), stock_id.clone())
          .with_sub_model("attachment", attachment_id.clone()),
      ),
      EntityActivity::Warehouse {
        warehouse_id, name, ..
      } => (
        format!("{} warehouse \"{}\"", verb, name),
        EntityDescriptor::new(self.model_name(), warehouse_id.clone()),
      ),
    };

    ActivityDescription {
      text,
      entity,
      account_id: self.account_id().to_string(),
    }
  }
}
