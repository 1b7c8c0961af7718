//! Java sources: controller, service, DAO, facade and DTOs

use crate::error::RenderError;
use crate::{Context, RenderedFile};
use cmig_model::naming::{self, lower_camel, upper_camel};
use cmig_model::{
    Artifact, DataAccessBody, EntryPointBody, FacadeBody, FieldBinding, HttpVerb, IntegrationStub,
    MethodSignature, ServiceBody, ServiceCall,
};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Platform beans with known types
const PLATFORM_TYPES: &[(&str, &str)] = &[
    ("userService", "de.hybris.platform.servicelayer.user.UserService"),
    ("baseStoreService", "de.hybris.platform.store.services.BaseStoreService"),
    ("commonI18NService", "de.hybris.platform.servicelayer.i18n.CommonI18NService"),
    ("i18nService", "de.hybris.platform.servicelayer.i18n.I18NService"),
    ("catalogVersionService", "de.hybris.platform.catalog.CatalogVersionService"),
    ("sessionService", "de.hybris.platform.servicelayer.session.SessionService"),
    ("cartService", "de.hybris.platform.order.CartService"),
    ("flexibleSearchService", "de.hybris.platform.servicelayer.search.FlexibleSearchService"),
    ("modelService", "de.hybris.platform.servicelayer.model.ModelService"),
];

const JDK_TYPES: &[(&str, &str)] = &[
    ("List", "java.util.List"),
    ("Map", "java.util.Map"),
    ("HashMap", "java.util.HashMap"),
    ("Optional", "java.util.Optional"),
    ("Date", "java.util.Date"),
    ("BigDecimal", "java.math.BigDecimal"),
    ("ResponseEntity", "org.springframework.http.ResponseEntity"),
    ("FlexibleSearchQuery", "de.hybris.platform.servicelayer.search.FlexibleSearchQuery"),
];

/// Simple type name and import for a bean
fn bean_type(bean: &str) -> (String, Option<&'static str>) {
    match PLATFORM_TYPES.iter().find(|(b, _)| *b == bean) {
        Some(&(_, fqcn)) => (
            fqcn.rsplit('.').next().unwrap_or(fqcn).to_string(),
            Some(fqcn),
        ),
        None => (upper_camel(bean), None),
    }
}

/// A constructor-injected collaborator
struct Injected {
    ty: String,
    name: String,
}

/// Assembles one compilation unit
struct JavaFile<'a> {
    ctx: &'a Context<'a>,
    package: String,
    imports: BTreeSet<String>,
}

impl<'a> JavaFile<'a> {
    fn new(ctx: &'a Context<'a>, sub_package: &str) -> Self {
        Self {
            ctx,
            package: ctx.package(sub_package),
            imports: BTreeSet::new(),
        }
    }

    fn import(&mut self, fqcn: impl Into<String>) {
        let fqcn = fqcn.into();
        let own = fqcn
            .rsplit_once('.')
            .is_some_and(|(pkg, _)| pkg == self.package);
        if !own {
            self.imports.insert(fqcn);
        }
    }

    /// Import every type the signature text mentions
    fn import_types(&mut self, text: &str) {
        for token in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if token.is_empty() {
                continue;
            }
            if let Some((_, fqcn)) = JDK_TYPES.iter().find(|(t, _)| *t == token) {
                self.import(*fqcn);
            } else if let Some(fqcn) = self.ctx.unit_type(token) {
                self.import(fqcn);
            }
        }
    }

    fn import_signature(&mut self, sig: &MethodSignature) {
        self.import_types(&sig.returns);
        for p in &sig.parameters {
            self.import_types(&p.ty);
        }
    }

    fn finish(self, class: &str, body: &str) -> RenderedFile {
        let mut content = format!("package {};\n\n", self.package);
        if !self.imports.is_empty() {
            for import in &self.imports {
                content.push_str("import ");
                content.push_str(import);
                content.push_str(";\n");
            }
            content.push('\n');
        }
        content.push_str(body);
        RenderedFile::new(self.ctx.java_path(&self.package, class), content)
    }
}

fn parameter_list(sig: &MethodSignature, annotate: impl Fn(&str, &str) -> String) -> String {
    sig.parameters
        .iter()
        .map(|p| format!("{}final {} {}", annotate(&p.name, &p.ty), p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn argument_list(sig: &MethodSignature) -> String {
    sig.parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn declaration(sig: &MethodSignature) -> String {
    format!(
        "{} {}({})",
        sig.returns,
        sig.name,
        parameter_list(sig, |_, _| String::new())
    )
}

fn write_injection(out: &mut String, class: &str, injected: &[Injected]) -> Result<(), RenderError> {
    if injected.is_empty() {
        return Ok(());
    }
    for dep in injected {
        writeln!(out, "    private final {} {};", dep.ty, dep.name)?;
    }
    writeln!(out)?;
    let params = injected
        .iter()
        .map(|d| format!("final {} {}", d.ty, d.name))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "    public {class}({params}) {{")?;
    for dep in injected {
        writeln!(out, "        this.{0} = {0};", dep.name)?;
    }
    writeln!(out, "    }}")?;
    writeln!(out)?;
    Ok(())
}

fn mapping_annotation(verb: HttpVerb) -> &'static str {
    match verb {
        HttpVerb::Get => "GetMapping",
        HttpVerb::Post => "PostMapping",
        HttpVerb::Put => "PutMapping",
        HttpVerb::Delete => "DeleteMapping",
    }
}

/// REST controller for the entry point
pub(crate) fn controller(
    ctx: &Context<'_>,
    artifact: &Artifact,
    body: &EntryPointBody,
) -> Result<RenderedFile, RenderError> {
    let class = &artifact.identifier;
    let mapping = mapping_annotation(body.endpoint.verb);
    let handler = &body.endpoint.handler;
    let delegate = Injected {
        ty: body.delegate.clone(),
        name: lower_camel(&body.delegate),
    };

    let mut file = JavaFile::new(ctx, "controller");
    file.import("org.springframework.web.bind.annotation.RestController");
    file.import(format!("org.springframework.web.bind.annotation.{mapping}"));
    if !body.parameters.is_empty() {
        file.import("org.springframework.web.bind.annotation.RequestParam");
    }
    if body.request_dto.is_some() {
        file.import("org.springframework.web.bind.annotation.RequestBody");
    }
    file.import_signature(handler);
    file.import_types(&body.delegate);

    let request_dto = body.request_dto.as_deref();
    let params = parameter_list(handler, |name, ty| {
        if Some(ty) == request_dto {
            "@RequestBody ".to_string()
        } else {
            format!("@RequestParam(\"{name}\") ")
        }
    });

    let mut out = String::new();
    writeln!(out, "@RestController")?;
    writeln!(out, "public class {class} {{")?;
    writeln!(out)?;
    write_injection(&mut out, class, std::slice::from_ref(&delegate))?;
    if !body.endpoint.source_method.is_empty() {
        writeln!(out, "    /** Migrated from {}. */", body.endpoint.source_method)?;
    }
    writeln!(out, "    @{mapping}(\"{}\")", body.endpoint.path)?;
    writeln!(out, "    public {} {}({params}) {{", handler.returns, handler.name)?;
    writeln!(
        out,
        "        return ResponseEntity.ok({}.{}({}));",
        delegate.name,
        handler.name,
        argument_list(handler)
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(file.finish(class, &out))
}

fn interface(
    ctx: &Context<'_>,
    sub_package: &str,
    name: &str,
    methods: &[MethodSignature],
) -> Result<RenderedFile, RenderError> {
    let mut file = JavaFile::new(ctx, sub_package);
    let mut out = String::new();
    writeln!(out, "public interface {name} {{")?;
    for (i, sig) in methods.iter().enumerate() {
        file.import_signature(sig);
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "    {};", declaration(sig))?;
    }
    writeln!(out, "}}")?;
    Ok(file.finish(name, &out))
}

/// Local variable for an accessor: `getUserId` → `userId`
fn accessor_variable(call: &ServiceCall) -> String {
    let stem = call.accessor.strip_prefix("get").unwrap_or(&call.accessor);
    let var = lower_camel(stem);
    if var.is_empty() {
        lower_camel(&call.accessor)
    } else {
        var
    }
}

/// Service interface and default implementation
pub(crate) fn service(
    ctx: &Context<'_>,
    artifact: &Artifact,
    body: &ServiceBody,
) -> Result<Vec<RenderedFile>, RenderError> {
    let api = interface(ctx, "service", &artifact.identifier, &body.methods)?;

    let mut file = JavaFile::new(ctx, "service.impl");
    file.import_types(&artifact.identifier);

    let mut injected: Vec<Injected> = body
        .collaborators
        .iter()
        .map(|c| {
            file.import_types(c);
            Injected {
                ty: c.clone(),
                name: lower_camel(c),
            }
        })
        .collect();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for call in &body.context_calls {
        if seen.insert(call.service.as_str()) {
            let (ty, fqcn) = bean_type(&call.service);
            if let Some(fqcn) = fqcn {
                file.import(fqcn);
            }
            injected.push(Injected {
                ty,
                name: call.service.clone(),
            });
        }
    }
    for IntegrationStub { interface, client } in &body.integration {
        file.import(ctx.package(&format!("integration.{interface}")));
        injected.push(Injected {
            ty: interface.clone(),
            name: client.clone(),
        });
    }

    let class = &body.implementation;
    let facade = body
        .collaborators
        .iter()
        .find(|c| c.ends_with("Facade"))
        .map(|c| lower_camel(c));

    let mut out = String::new();
    writeln!(out, "public class {class} implements {} {{", artifact.identifier)?;
    writeln!(out)?;
    write_injection(&mut out, class, &injected)?;
    for sig in &body.methods {
        file.import_signature(sig);
        writeln!(out, "    @Override")?;
        writeln!(out, "    public {} {{", declaration(sig))?;
        for call in &body.context_calls {
            writeln!(
                out,
                "        final var {} = {};",
                accessor_variable(call),
                call.expression
            )?;
        }
        for stub in &body.integration {
            writeln!(
                out,
                "        // {} is injected as {} for calls into the external system",
                stub.interface, stub.client
            )?;
        }
        if sig.returns == "ResponseDTO" {
            match &facade {
                Some(facade) => {
                    writeln!(out, "        return {facade}.toResponse(\"SUCCESS\", null);")?;
                }
                None => {
                    writeln!(out, "        final ResponseDTO response = new ResponseDTO();")?;
                    writeln!(out, "        response.setStatus(\"SUCCESS\");")?;
                    writeln!(out, "        return response;")?;
                }
            }
        }
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    Ok(vec![api, file.finish(class, &out)])
}

fn finder_query(item: &str, attribute: Option<&str>) -> String {
    match attribute {
        Some(attr) => format!("SELECT {{pk}} FROM {{{item}}} WHERE {{{attr}}} = ?{attr}"),
        None => format!("SELECT {{pk}} FROM {{{item}}}"),
    }
}

/// DAO interface and FlexibleSearch implementation
pub(crate) fn data_access(
    ctx: &Context<'_>,
    artifact: &Artifact,
    body: &DataAccessBody,
) -> Result<Vec<RenderedFile>, RenderError> {
    let api = interface(ctx, "dao", &artifact.identifier, &body.methods)?;

    let item = &body.item_type;
    let type_code = naming::type_code(item);
    let mut file = JavaFile::new(ctx, "dao.impl");
    file.import_types(&artifact.identifier);
    let injected: Vec<Injected> = ["flexibleSearchService", "modelService"]
        .into_iter()
        .map(|bean| {
            let (ty, fqcn) = bean_type(bean);
            if let Some(fqcn) = fqcn {
                file.import(fqcn);
            }
            Injected {
                ty,
                name: bean.to_string(),
            }
        })
        .collect();

    let class = &body.implementation;
    let mut out = String::new();
    writeln!(out, "public class {class} implements {} {{", artifact.identifier)?;
    writeln!(out)?;
    if !body.attributes.is_empty() {
        let columns: Vec<&str> = body.attributes.iter().map(|a| a.name.as_str()).collect();
        writeln!(out, "    /** Persisted attributes: {}. */", columns.join(", "))?;
    }
    writeln!(
        out,
        "    private static final String FIND_ALL = \"{}\";",
        finder_query(type_code, None)
    )?;
    writeln!(out)?;
    write_injection(&mut out, class, &injected)?;

    for sig in &body.methods {
        file.import_signature(sig);
        writeln!(out, "    @Override")?;
        writeln!(out, "    public {} {{", declaration(sig))?;
        match sig.name.as_str() {
            "findAll" => {
                writeln!(
                    out,
                    "        return flexibleSearchService.<{item}>search(FIND_ALL).getResult();"
                )?;
            }
            "save" => {
                writeln!(out, "        modelService.save(model);")?;
            }
            _ => {
                let Some(param) = sig.parameters.first() else {
                    writeln!(out, "        return Optional.empty();")?;
                    writeln!(out, "    }}")?;
                    continue;
                };
                file.import_types("FlexibleSearchQuery");
                writeln!(
                    out,
                    "        final FlexibleSearchQuery query = new FlexibleSearchQuery(\"{}\");",
                    finder_query(type_code, Some(&param.name))
                )?;
                writeln!(
                    out,
                    "        query.addQueryParameter(\"{0}\", {0});",
                    param.name
                )?;
                writeln!(
                    out,
                    "        return flexibleSearchService.<{item}>search(query).getResult().stream().findFirst();"
                )?;
            }
        }
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    Ok(vec![api, file.finish(class, &out)])
}

/// Facade interface and default implementation
pub(crate) fn facade(
    ctx: &Context<'_>,
    artifact: &Artifact,
    body: &FacadeBody,
) -> Result<Vec<RenderedFile>, RenderError> {
    let api = interface(ctx, "facade", &artifact.identifier, &body.methods)?;

    let mut file = JavaFile::new(ctx, "facade.impl");
    file.import_types(&artifact.identifier);
    let class = &body.implementation;
    let mut out = String::new();
    writeln!(out, "public class {class} implements {} {{", artifact.identifier)?;
    for sig in &body.methods {
        file.import_signature(sig);
        writeln!(out)?;
        writeln!(out, "    @Override")?;
        writeln!(out, "    public {} {{", declaration(sig))?;
        match sig.name.as_str() {
            "toResponse" => {
                writeln!(out, "        final ResponseDTO response = new ResponseDTO();")?;
                writeln!(out, "        response.setStatus(status);")?;
                writeln!(out, "        response.setMessage(message);")?;
                writeln!(out, "        return response;")?;
            }
            _ => {
                file.import_types("HashMap");
                writeln!(out, "        final Map<String, Object> values = new HashMap<>();")?;
                for field in &body.fields {
                    writeln!(
                        out,
                        "        values.put(\"{0}\", request.get{1}());",
                        field.name,
                        upper_camel(&field.name)
                    )?;
                }
                writeln!(out, "        return values;")?;
            }
        }
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    Ok(vec![api, file.finish(class, &out)])
}

/// Plain DTO with getters and setters
pub(crate) fn dto(
    ctx: &Context<'_>,
    name: &str,
    fields: &[(String, String)],
) -> Result<RenderedFile, RenderError> {
    let mut file = JavaFile::new(ctx, "dto");
    let mut out = String::new();
    writeln!(out, "public class {name} {{")?;
    writeln!(out)?;
    for (field, ty) in fields {
        file.import_types(ty);
        writeln!(out, "    private {ty} {field};")?;
    }
    for (field, ty) in fields {
        let prop = upper_camel(field);
        writeln!(out)?;
        writeln!(out, "    public {ty} get{prop}() {{")?;
        writeln!(out, "        return {field};")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    public void set{prop}(final {ty} {field}) {{")?;
        writeln!(out, "        this.{field} = {field};")?;
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    Ok(file.finish(name, &out))
}

/// Request DTO fields, typed for the target
pub(crate) fn dto_fields(bindings: &[FieldBinding]) -> Vec<(String, String)> {
    bindings
        .iter()
        .map(|b| (b.name.clone(), b.ty.target_name()))
        .collect()
}

/// Shared response envelope
pub(crate) fn response_dto(ctx: &Context<'_>) -> Result<RenderedFile, RenderError> {
    let fields: Vec<(String, String)> = ["status", "orderId", "message", "error"]
        .into_iter()
        .map(|f| (f.to_string(), "String".to_string()))
        .collect();
    dto(ctx, "ResponseDTO", &fields)
}
