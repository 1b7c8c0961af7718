//! Rendering the scenario fixtures end to end

use cmig_engine::{engine, generator, ArtifactPlan};
use cmig_render::{RenderedFile, Renderer};
use cmig_test_utils::{
    classified, create_voucher, default_rules, display_invoices, loyalty_lookup, nightly_export,
};
use cmig_engine::RawCommand;
use pretty_assertions::assert_eq;
use std::path::Path;

fn render_with(renderer: &Renderer, raw: &RawCommand) -> (ArtifactPlan, Vec<RenderedFile>) {
    let plan = engine::apply(&classified(raw), &default_rules());
    let set = generator::generate(plan.clone());
    let files = renderer.render(&set, &plan.unresolved).unwrap();
    (plan, files)
}

fn render(raw: &RawCommand) -> Vec<RenderedFile> {
    render_with(&Renderer::default(), raw).1
}

fn file<'a>(files: &'a [RenderedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == Path::new(path))
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("missing {path}"))
}

#[test]
fn scenario_a_files() {
    let files = render(&display_invoices());
    let mut paths: Vec<String> = files
        .iter()
        .map(|f| f.path.to_string_lossy().into_owned())
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "src/main/java/com/example/controller/DisplayInvoicesController.java",
            "src/main/java/com/example/dao/DisplayInvoicesDAO.java",
            "src/main/java/com/example/dao/impl/DefaultDisplayInvoicesDAO.java",
            "src/main/java/com/example/dto/ResponseDTO.java",
            "src/main/java/com/example/service/DisplayInvoicesService.java",
            "src/main/java/com/example/service/impl/DefaultDisplayInvoicesService.java",
            "src/main/resources/displayInvoicesWiring-spring.xml",
        ]
    );
}

#[test]
fn scenario_a_controller() {
    let files = render(&display_invoices());
    let controller = file(
        &files,
        "src/main/java/com/example/controller/DisplayInvoicesController.java",
    );
    assert!(controller.starts_with("package com.example.controller;"));
    assert!(controller.contains("import com.example.service.DisplayInvoicesService;"));
    assert!(controller.contains("import org.springframework.http.ResponseEntity;"));
    assert!(controller.contains("@PostMapping(\"/api/displayinvoices\")"));
    assert!(controller.contains("@RequestParam(\"invoiceId\") final String invoiceId"));
    assert!(controller.contains("return ResponseEntity.ok(displayInvoicesService.displayInvoices(invoiceId));"));
}

#[test]
fn scenario_a_service_reads_user_explicitly() {
    let files = render(&display_invoices());
    let service = file(
        &files,
        "src/main/java/com/example/service/impl/DefaultDisplayInvoicesService.java",
    );
    assert!(service.contains("public class DefaultDisplayInvoicesService implements DisplayInvoicesService"));
    assert!(service.contains("import de.hybris.platform.servicelayer.user.UserService;"));
    assert!(service.contains("private final UserService userService;"));
    assert!(service.contains("final var userId = userService.getCurrentUser().getUid();"));
    assert!(service.contains("response.setStatus(\"SUCCESS\");"));
}

#[test]
fn scenario_a_wiring() {
    let files = render(&display_invoices());
    let xml = file(&files, "src/main/resources/displayInvoicesWiring-spring.xml");
    assert!(xml.contains(
        "<alias name=\"displayInvoicesService\" alias=\"defaultDisplayInvoicesService\"/>"
    ));
    assert!(xml.contains(
        "class=\"com.example.service.impl.DefaultDisplayInvoicesService\""
    ));
    assert!(xml.contains("class=\"com.example.dao.impl.DefaultDisplayInvoicesDAO\""));
    assert!(xml.contains("<constructor-arg ref=\"userService\"/>"));
    assert!(xml.trim_end().ends_with("</beans>"));
}

#[test]
fn scenario_b_lists_unresolved_accessor() {
    let files = render(&loyalty_lookup());
    let report = file(&files, "UNRESOLVED.md");
    assert!(report.contains("# Unresolved references: DisplayInvoices"));
    assert!(report.contains("| context_access | `getLoyaltyTier` | no accessor binding |"));
    assert!(!report.contains("getUserId"));
}

#[test]
fn no_report_without_unresolved() {
    let files = render(&display_invoices());
    assert!(files.iter().all(|f| f.file_name() != Some("UNRESOLVED.md")));
}

#[test]
fn facade_and_dto_for_complex_handler() {
    let files = render(&create_voucher());
    let dto = file(&files, "src/main/java/com/example/dto/CreateVoucherDTO.java");
    assert!(dto.contains("private List<VoucherRestriction> restrictions;"));
    assert!(dto.contains("import java.util.List;"));

    let facade = file(
        &files,
        "src/main/java/com/example/facade/impl/DefaultCreateVoucherFacade.java",
    );
    assert!(facade.contains("values.put(\"restrictions\", request.getRestrictions());"));

    let service = file(
        &files,
        "src/main/java/com/example/service/impl/DefaultCreateVoucherService.java",
    );
    assert!(service.contains("return createVoucherFacade.toResponse(\"SUCCESS\", null);"));

    let impex = file(&files, "src/main/resources/impex/CreateVoucherInitialData.impex");
    assert!(impex.contains("INSERT_UPDATE CreateVoucher;code[unique=true]"));
    let dao = file(
        &files,
        "src/main/java/com/example/dao/impl/DefaultCreateVoucherDAO.java",
    );
    assert!(dao.contains("SELECT {pk} FROM {CreateVoucher}"));
}

#[test]
fn background_task_has_no_controller() {
    let files = render(&nightly_export());
    assert!(files
        .iter()
        .all(|f| !f.path.to_string_lossy().contains("/controller/")));
    assert!(files.iter().all(|f| f.file_name() != Some("ResponseDTO.java")));

    let dao = file(
        &files,
        "src/main/java/com/example/dao/impl/DefaultNightlyExportDAO.java",
    );
    assert!(dao.contains("SELECT {pk} FROM {NightlyExport}"));

    let service = file(
        &files,
        "src/main/java/com/example/service/impl/DefaultNightlyExportService.java",
    );
    assert!(service.contains("import com.example.integration.ErpGateway;"));
    assert!(service.contains("private final ErpGateway erpGateway;"));
}

#[test]
fn base_package_is_applied() {
    let renderer = Renderer::new("com.acme.shop").unwrap();
    let (_, files) = render_with(&renderer, &display_invoices());
    let controller = file(
        &files,
        "src/main/java/com/acme/shop/controller/DisplayInvoicesController.java",
    );
    assert!(controller.starts_with("package com.acme.shop.controller;"));
}
