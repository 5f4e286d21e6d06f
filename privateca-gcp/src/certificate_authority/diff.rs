//! Resource-level diff

use privateca_core::differ::{DiffInfo, Differ, FieldDiff, FieldPath};

use super::{CertificateAuthority, UPDATE_OPERATION};

const RECREATE: DiffInfo = DiffInfo::recreate();
const OUTPUT_ONLY: DiffInfo = DiffInfo::output_only();

pub(super) fn diff(desired: &CertificateAuthority, actual: &CertificateAuthority) -> Vec<FieldDiff> {
    let root = FieldPath::root();
    let mut d = Differ::new();

    d.diff_field(&desired.name, &actual.name, RECREATE, root.nest("Name"));
    d.diff_field(&desired.project, &actual.project, RECREATE, root.nest("Project"));
    d.diff_field(&desired.location, &actual.location, RECREATE, root.nest("Location"));
    d.diff_field(&desired.ca_pool, &actual.ca_pool, RECREATE, root.nest("CaPool"));
    d.diff_field(&desired.ca_type, &actual.ca_type, RECREATE, root.nest("Type"));
    d.diff_field(&desired.config, &actual.config, RECREATE, root.nest("Config"));
    d.diff_field(&desired.lifetime, &actual.lifetime, RECREATE, root.nest("Lifetime"));
    d.diff_field(&desired.key_spec, &actual.key_spec, RECREATE, root.nest("KeySpec"));
    d.diff_field(
        &desired.subordinate_config,
        &actual.subordinate_config,
        RECREATE,
        root.nest("SubordinateConfig"),
    );
    d.diff_field(&desired.gcs_bucket, &actual.gcs_bucket, RECREATE, root.nest("GcsBucket"));
    d.diff_field(
        &desired.labels,
        &actual.labels,
        DiffInfo::update(UPDATE_OPERATION),
        root.nest("Labels"),
    );

    d.diff_field(&desired.tier, &actual.tier, OUTPUT_ONLY, root.nest("Tier"));
    d.diff_field(&desired.state, &actual.state, OUTPUT_ONLY, root.nest("State"));
    d.diff_field(
        &desired.pem_ca_certificates,
        &actual.pem_ca_certificates,
        OUTPUT_ONLY,
        root.nest("PemCaCertificates"),
    );
    d.diff_field(
        &desired.ca_certificate_descriptions,
        &actual.ca_certificate_descriptions,
        OUTPUT_ONLY,
        root.nest("CaCertificateDescriptions"),
    );
    d.diff_field(&desired.access_urls, &actual.access_urls, OUTPUT_ONLY, root.nest("AccessUrls"));
    // Timestamps are output only as well and are not compared.

    d.into_diffs()
}
