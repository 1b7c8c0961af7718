//! Spring bean definitions for the wiring artifact

use crate::error::RenderError;
use crate::{Context, RenderedFile};
use cmig_model::{Artifact, LayerKind, WiringBody};
use std::fmt::Write;
use std::path::PathBuf;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://www.springframework.org/schema/beans"
       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
       xsi:schemaLocation="http://www.springframework.org/schema/beans
           http://www.springframework.org/schema/beans/spring-beans.xsd">
"#;

fn impl_package(layer: LayerKind) -> &'static str {
    match layer {
        LayerKind::DataAccess => "dao.impl",
        LayerKind::Facade => "facade.impl",
        LayerKind::EntryPoint => "controller",
        LayerKind::Service | LayerKind::Wiring | LayerKind::BulkData => "service.impl",
    }
}

pub(crate) fn beans(
    ctx: &Context<'_>,
    artifact: &Artifact,
    body: &WiringBody,
) -> Result<RenderedFile, RenderError> {
    let mut out = String::from(HEADER);
    for entry in &body.entries {
        writeln!(out)?;
        if let Some(alias) = &entry.alias {
            writeln!(out, "    <alias name=\"{}\" alias=\"{alias}\"/>", entry.bean_id)?;
        }
        let class = format!("{}.{}", ctx.package(impl_package(entry.layer)), entry.class_name);
        if entry.references.is_empty() {
            writeln!(out, "    <bean id=\"{}\" class=\"{class}\"/>", entry.bean_id)?;
        } else {
            writeln!(out, "    <bean id=\"{}\" class=\"{class}\">", entry.bean_id)?;
            for reference in &entry.references {
                writeln!(out, "        <constructor-arg ref=\"{reference}\"/>")?;
            }
            writeln!(out, "    </bean>")?;
        }
    }
    writeln!(out)?;
    writeln!(out, "</beans>")?;

    let path = PathBuf::from("src/main/resources").join(format!("{}-spring.xml", artifact.identifier));
    Ok(RenderedFile::new(path, out))
}
