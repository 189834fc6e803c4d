// Copyright 2025 Cowboy AI, LLC.

//! JSON Schema for the result wire shape
//!
//! [`DomainResult`] serializes by hand (the `success` discriminant plus
//! flat error channels), so its schema is written by hand too, matching
//! what the custom `Serialize` impl emits.

use schemars::schema::{
    InstanceType, Metadata, ObjectValidation, Schema, SchemaObject, SubschemaValidation,
};
use schemars::JsonSchema;

use crate::result::{DomainResult, ErrorWithMessage, SchemaError};

impl<T: JsonSchema> JsonSchema for DomainResult<T> {
    fn schema_name() -> String {
        format!("DomainResult_{}", T::schema_name())
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> Schema {
        let success_literal = |value: bool| {
            Schema::Object(SchemaObject {
                instance_type: Some(InstanceType::Boolean.into()),
                enum_values: Some(vec![serde_json::json!(value)]),
                ..SchemaObject::default()
            })
        };

        // Success variant: data present, error channels empty.
        let mut success_object = ObjectValidation::default();
        success_object
            .properties
            .insert("success".to_owned(), success_literal(true));
        success_object
            .properties
            .insert("data".to_owned(), gen.subschema_for::<T>());
        success_object
            .properties
            .insert("errors".to_owned(), gen.subschema_for::<Vec<ErrorWithMessage>>());
        success_object
            .properties
            .insert("inputErrors".to_owned(), gen.subschema_for::<Vec<SchemaError>>());
        success_object.properties.insert(
            "environmentErrors".to_owned(),
            gen.subschema_for::<Vec<SchemaError>>(),
        );
        for required in ["success", "data", "errors", "inputErrors", "environmentErrors"] {
            success_object.required.insert(required.to_owned());
        }
        let success_schema = Schema::Object(SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(success_object)),
            ..SchemaObject::default()
        });

        // Failure variant: no data, channels carry the errors.
        let mut failure_object = ObjectValidation::default();
        failure_object
            .properties
            .insert("success".to_owned(), success_literal(false));
        failure_object
            .properties
            .insert("errors".to_owned(), gen.subschema_for::<Vec<ErrorWithMessage>>());
        failure_object
            .properties
            .insert("inputErrors".to_owned(), gen.subschema_for::<Vec<SchemaError>>());
        failure_object.properties.insert(
            "environmentErrors".to_owned(),
            gen.subschema_for::<Vec<SchemaError>>(),
        );
        for required in ["success", "errors", "inputErrors", "environmentErrors"] {
            failure_object.required.insert(required.to_owned());
        }
        let failure_schema = Schema::Object(SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(failure_object)),
            ..SchemaObject::default()
        });

        Schema::Object(SchemaObject {
            subschemas: Some(Box::new(SubschemaValidation {
                one_of: Some(vec![success_schema, failure_schema]),
                ..SubschemaValidation::default()
            })),
            metadata: Some(Box::new(Metadata {
                title: Some(Self::schema_name()),
                description: Some(
                    "Outcome of a domain function: success with data, or failure with \
                     runtime, input, and environment error channels"
                        .to_owned(),
                ),
                ..Metadata::default()
            })),
            ..SchemaObject::default()
        })
    }
}
