//! Validation and instantiation of parsed annotations.

use crate::metadata::{builtins, AnnotationDescriptor, AttributeType, Construction, ValueType};
use docmeta_core::{
    AnnotationInstance, AnnotationResult, ClassCatalog, SemanticError, Targets, Value, ValueMap,
};

/// Check that an annotation may appear on the active target. The empty
/// target disables the check.
pub fn check_target(
    descriptor: &AnnotationDescriptor,
    target: Targets,
    annotation: &str,
    context: &str,
) -> AnnotationResult<()> {
    if target.is_empty() || descriptor.targets.intersects(target) {
        return Ok(());
    }
    Err(SemanticError::DisallowedTarget {
        annotation: annotation.to_string(),
        context: context.to_string(),
        allowed: descriptor.allowed_targets_label(),
    }
    .into())
}

/// Validates a parsed value map against a descriptor and builds the instance.
pub struct Instantiator<'a> {
    catalog: &'a dyn ClassCatalog,
    context: &'a str,
}

impl<'a> Instantiator<'a> {
    pub fn new(catalog: &'a dyn ClassCatalog, context: &'a str) -> Self {
        Self { catalog, context }
    }

    /// `name` is the resolved type name, `original` the name as written.
    pub fn instantiate(
        &self,
        name: &str,
        original: &str,
        descriptor: &AnnotationDescriptor,
        mut values: ValueMap,
    ) -> AnnotationResult<AnnotationInstance> {
        // A named default property wins over the positional value.
        if let Some(default) = descriptor.default_property.as_deref().filter(|d| *d != "value") {
            if let Some(value) = values.remove("value") {
                values.entry(default.to_string()).or_insert(value);
            }
        }

        self.check_enums(name, descriptor, &values)?;

        for attribute in &descriptor.attribute_types {
            self.check_attribute(original, attribute, &mut values)?;
        }

        match descriptor.construction {
            Construction::Constructor => self.construct(name, Some(values)),
            Construction::PropertyInjection => self.inject(name, original, descriptor, values),
        }
    }

    fn check_enums(
        &self,
        name: &str,
        descriptor: &AnnotationDescriptor,
        values: &ValueMap,
    ) -> AnnotationResult<()> {
        for (property, constraint) in &descriptor.enum_constraints {
            let Some(value) = values.get(property).filter(|v| !v.is_null()) else {
                continue;
            };
            if !constraint.allows(value) {
                return Err(SemanticError::EnumeratorViolation {
                    attribute: property.clone(),
                    annotation: name.to_string(),
                    context: self.context.to_string(),
                    allowed: constraint.display.clone(),
                    given: value.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn check_attribute(
        &self,
        original: &str,
        attribute: &AttributeType,
        values: &mut ValueMap,
    ) -> AnnotationResult<()> {
        let Some(value) = values.get_mut(&attribute.name).filter(|v| !v.is_null()) else {
            if attribute.required {
                return Err(SemanticError::RequiredAttributeMissing {
                    attribute: attribute.name.clone(),
                    annotation: original.to_string(),
                    context: self.context.to_string(),
                    expected: format!("a(n) {}", attribute.declared),
                }
                .into());
            }
            return Ok(());
        };

        if attribute.value_type == ValueType::Array {
            if !matches!(value, Value::Array(_)) {
                let single = std::mem::take(value);
                *value = Value::list([single]);
            }

            if let (Some(element), Value::Array(items)) = (&attribute.element_type, &*value) {
                if let Some(bad) = items.values().find(|item| !element.accepts(item, self.catalog)) {
                    return Err(self.mismatch(
                        original,
                        attribute,
                        format!("either a(n) {}, or an array of {}s", element, element),
                        bad,
                    ));
                }
            }
            return Ok(());
        }

        if !attribute.value_type.accepts(value, self.catalog) {
            return Err(self.mismatch(
                original,
                attribute,
                format!("a(n) {}", attribute.declared),
                value,
            ));
        }
        Ok(())
    }

    fn mismatch(
        &self,
        original: &str,
        attribute: &AttributeType,
        expected: String,
        actual: &Value,
    ) -> docmeta_core::AnnotationError {
        SemanticError::AttributeTypeMismatch {
            attribute: attribute.name.clone(),
            annotation: original.to_string(),
            context: self.context.to_string(),
            expected,
            actual: actual.type_label(),
        }
        .into()
    }

    fn construct(&self, name: &str, args: Option<ValueMap>) -> AnnotationResult<AnnotationInstance> {
        match builtins::instantiate(name, args.clone()) {
            Some(result) => result,
            None => Ok(self.catalog.construct(name, args)?),
        }
    }

    fn inject(
        &self,
        name: &str,
        original: &str,
        descriptor: &AnnotationDescriptor,
        values: ValueMap,
    ) -> AnnotationResult<AnnotationInstance> {
        let mut instance = self.construct(name, None)?;
        let snapshot = values_json(&values);

        for (property, value) in values {
            if descriptor.has_property(&property) {
                instance.set(property, value);
                continue;
            }

            // `value` only survives folding when there is no default property.
            if property == "value" {
                return Err(SemanticError::NoValueAccepted {
                    annotation: original.to_string(),
                    context: self.context.to_string(),
                    values: snapshot,
                }
                .into());
            }

            return Err(SemanticError::UnknownProperty {
                annotation: original.to_string(),
                context: self.context.to_string(),
                property,
                available: descriptor.properties.clone(),
            }
            .into());
        }

        Ok(instance)
    }
}

fn values_json(values: &ValueMap) -> String {
    serde_json::Value::Object(
        values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
    .to_string()
}
