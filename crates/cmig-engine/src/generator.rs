//! Artifact generator
//!
//! Turns a plan into concrete artifact records. Artifacts are emitted in
//! canonical layer order and only reference layers present in the plan:
//!
//! ```text
//! EntryPoint -> Service -> DataAccess
//!               Service -> Facade
//! BulkData   -> DataAccess
//! Wiring     -> every other artifact
//! ```

use crate::plan::ArtifactPlan;
use cmig_model::naming::{
    bean_id, dto_for, identifier_for, implementation_for, lower_camel, model_for, upper_camel,
};
use cmig_model::{
    Artifact, ArtifactBody, ArtifactSet, BulkDataBody, DataAccessBody, Endpoint, EntryPointBody,
    FacadeBody, FieldBinding, FieldDestination, HttpVerb, LayerKind, MethodSignature, ServiceBody,
    WiringBody, WiringEntry,
};
use indexmap::IndexSet;

/// Response type shared by every entry point
pub const RESPONSE_DTO: &str = "ResponseDTO";

const DTO_PARAMETER: &str = "request";

/// Generate the artifact set for a plan
#[must_use]
pub fn generate(plan: ArtifactPlan) -> ArtifactSet {
    let generator = Generator { plan: &plan };
    let mut set = ArtifactSet::new(plan.unit.clone(), plan.category);
    for layer in plan.target_layers.iter().copied() {
        let artifact = match layer {
            LayerKind::EntryPoint => generator.entry_point(),
            LayerKind::Service => generator.service(),
            LayerKind::DataAccess => generator.data_access(),
            LayerKind::Facade => generator.facade(),
            LayerKind::Wiring => generator.wiring(),
            LayerKind::BulkData => generator.bulk_data(),
        };
        set.push(artifact);
    }
    tracing::debug!(unit = %plan.unit, artifacts = set.len(), "artifacts generated");
    set
}

struct Generator<'a> {
    plan: &'a ArtifactPlan,
}

impl Generator<'_> {
    fn id(&self, layer: LayerKind) -> String {
        identifier_for(layer, &self.plan.unit)
    }

    fn implementation(&self, layer: LayerKind) -> String {
        implementation_for(layer, &self.plan.unit).unwrap_or_else(|| self.id(layer))
    }

    /// Identifier of `layer` when the plan includes it
    fn present(&self, layer: LayerKind) -> Option<String> {
        self.plan.has_layer(layer).then(|| self.id(layer))
    }

    fn item_type(&self) -> String {
        model_for(&self.plan.unit)
    }

    fn operation(&self) -> String {
        lower_camel(&self.plan.unit)
    }

    fn owned(&self, layer: LayerKind) -> Vec<FieldBinding> {
        self.plan.bindings_owned_by(layer).cloned().collect()
    }

    fn request_body(&self) -> Vec<FieldBinding> {
        self.plan
            .bindings_to(FieldDestination::RequestBody)
            .cloned()
            .collect()
    }

    /// Name of the request DTO parameter, clear of every request parameter
    fn dto_parameter(&self) -> String {
        let mut name = String::from(DTO_PARAMETER);
        while self
            .plan
            .bindings_to(FieldDestination::RequestParameter)
            .any(|b| b.name == name)
        {
            name.push_str("Dto");
        }
        name
    }

    /// Parameters of the unit's main operation
    fn operation_signature(&self, returns: &str) -> MethodSignature {
        let mut sig = MethodSignature::new(self.operation(), returns);
        for binding in self.plan.bindings_to(FieldDestination::RequestParameter) {
            sig = sig.with_parameter(binding.name.clone(), binding.ty.target_name());
        }
        if self.plan.bindings_to(FieldDestination::RequestBody).next().is_some() {
            sig = sig.with_parameter(self.dto_parameter(), dto_for(&self.plan.unit));
        }
        sig
    }

    fn entry_point(&self) -> Artifact {
        let source = self.plan.entry_point.clone();
        let (verb, path, source_method) = source.map_or_else(
            || {
                (
                    HttpVerb::Post,
                    format!("/api/{}", self.plan.unit.to_ascii_lowercase()),
                    String::new(),
                )
            },
            |ep| (ep.verb, ep.path, ep.source_method),
        );
        let request_body = self.request_body();
        let body = EntryPointBody {
            endpoint: Endpoint {
                verb,
                path,
                source_method,
                handler: self.operation_signature(&format!("ResponseEntity<{RESPONSE_DTO}>")),
            },
            delegate: self.id(LayerKind::Service),
            parameters: self
                .plan
                .bindings_to(FieldDestination::RequestParameter)
                .cloned()
                .collect(),
            request_dto: (!request_body.is_empty()).then(|| dto_for(&self.plan.unit)),
            request_body,
        };
        let mut artifact = Artifact::new(self.id(LayerKind::EntryPoint), ArtifactBody::EntryPoint(body));
        if let Some(service) = self.present(LayerKind::Service) {
            artifact = artifact.depending_on(service);
        }
        artifact
    }

    fn service(&self) -> Artifact {
        let returns = if self.plan.has_layer(LayerKind::EntryPoint) {
            RESPONSE_DTO
        } else {
            "void"
        };
        let collaborators: Vec<String> = [LayerKind::DataAccess, LayerKind::Facade]
            .into_iter()
            .filter_map(|layer| self.present(layer))
            .collect();
        let body = ServiceBody {
            implementation: self.implementation(LayerKind::Service),
            methods: vec![self.operation_signature(returns)],
            context_calls: self.plan.service_calls.clone(),
            integration: self.plan.integrations.clone(),
            collaborators: collaborators.clone(),
        };
        collaborators.into_iter().fold(
            Artifact::new(self.id(LayerKind::Service), ArtifactBody::Service(body)),
            |artifact, id| artifact.depending_on(id),
        )
    }

    fn data_access(&self) -> Artifact {
        let item = self.item_type();
        let attributes = self.owned(LayerKind::DataAccess);
        let mut methods = vec![
            MethodSignature::new("findAll", format!("List<{item}>")),
            MethodSignature::new("save", "void").with_parameter("model", item.clone()),
        ];
        for attr in attributes.iter().filter(|a| a.identifying) {
            methods.push(
                MethodSignature::new(
                    format!("findBy{}", upper_camel(&attr.name)),
                    format!("Optional<{item}>"),
                )
                .with_parameter(attr.name.clone(), attr.ty.target_name()),
            );
        }
        let body = DataAccessBody {
            implementation: self.implementation(LayerKind::DataAccess),
            item_type: item,
            attributes,
            methods,
        };
        Artifact::new(self.id(LayerKind::DataAccess), ArtifactBody::DataAccess(body))
    }

    fn facade(&self) -> Artifact {
        let dto = dto_for(&self.plan.unit);
        let mut fields = self.owned(LayerKind::EntryPoint);
        if fields.is_empty() {
            fields = self.plan.field_bindings.clone();
        }
        let mut methods = vec![MethodSignature::new("toResponse", RESPONSE_DTO)
            .with_parameter("status", "String")
            .with_parameter("message", "String")];
        if !fields.is_empty() {
            methods.push(
                MethodSignature::new("fromRequest", "Map<String, Object>")
                    .with_parameter("request", dto.clone()),
            );
        }
        let body = FacadeBody {
            implementation: self.implementation(LayerKind::Facade),
            dto,
            fields,
            methods,
        };
        Artifact::new(self.id(LayerKind::Facade), ArtifactBody::Facade(body))
    }

    fn wiring(&self) -> Artifact {
        let dao = self.present(LayerKind::DataAccess).map(|id| bean_id(&id));
        let facade = self.present(LayerKind::Facade).map(|id| bean_id(&id));
        let mut entries = Vec::new();

        if let Some(dao) = &dao {
            entries.push(WiringEntry {
                bean_id: dao.clone(),
                layer: LayerKind::DataAccess,
                class_name: self.implementation(LayerKind::DataAccess),
                alias: None,
                references: vec![
                    "flexibleSearchService".to_string(),
                    "modelService".to_string(),
                ],
            });
        }
        if let Some(facade) = &facade {
            entries.push(WiringEntry {
                bean_id: facade.clone(),
                layer: LayerKind::Facade,
                class_name: self.implementation(LayerKind::Facade),
                alias: None,
                references: Vec::new(),
            });
        }
        if self.plan.has_layer(LayerKind::Service) {
            let mut refs: IndexSet<String> = dao.iter().chain(&facade).cloned().collect();
            refs.extend(self.plan.service_calls.iter().map(|c| c.service.clone()));
            refs.extend(self.plan.integrations.iter().map(|i| i.client.clone()));
            let service = self.id(LayerKind::Service);
            entries.push(WiringEntry {
                bean_id: bean_id(&service),
                layer: LayerKind::Service,
                class_name: self.implementation(LayerKind::Service),
                alias: Some(bean_id(&self.implementation(LayerKind::Service))),
                references: refs.into_iter().collect(),
            });
        }

        let mut artifact = Artifact::new(
            self.id(LayerKind::Wiring),
            ArtifactBody::Wiring(WiringBody { entries }),
        );
        for layer in &self.plan.target_layers {
            if *layer != LayerKind::Wiring {
                artifact = artifact.depending_on(self.id(*layer));
            }
        }
        artifact
    }

    fn bulk_data(&self) -> Artifact {
        let bindings = &self.plan.field_bindings;
        let body = BulkDataBody {
            item_type: self.item_type(),
            columns: bindings.iter().map(|b| b.name.clone()).collect(),
            unique_columns: bindings
                .iter()
                .filter(|b| b.identifying)
                .map(|b| b.name.clone())
                .collect(),
        };
        let mut artifact = Artifact::new(self.id(LayerKind::BulkData), ArtifactBody::BulkData(body));
        if let Some(dao) = self.present(LayerKind::DataAccess) {
            artifact = artifact.depending_on(dao);
        }
        artifact
    }
}
