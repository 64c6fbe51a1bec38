use super::blocks::{self, BlockKind, Entry};
use super::dom::{self, Document};
use super::fields::{parse_fields, REQUIRED_LABEL, TYPE_LABEL, UPDATE_LABEL};
use super::text::normalize;
use crate::error::ExtractError;
use crate::model::{AttributeRecord, PropertyRecord, ResourceRecord};

const JSON_CONTAINER: &str = "JSON";
const YAML_CONTAINER: &str = "YAML";
const LISTING_SELECTOR: &str = ".programlisting";

/// What one kind of reference page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProfile {
    pub labels: &'static [&'static str],
    /// Collect return-value (attribute) lists.
    pub attributes: bool,
    /// Collect JSON/YAML sample snippets.
    pub samples: bool,
    /// Record the page URL on the resource.
    pub source_url: bool,
}

impl PageProfile {
    /// Template resource reference pages (`AWS::Service::Resource`).
    pub const TEMPLATE_RESOURCE: PageProfile = PageProfile {
        labels: &[REQUIRED_LABEL, TYPE_LABEL, UPDATE_LABEL],
        attributes: true,
        samples: true,
        source_url: true,
    };

    /// Resource property type pages.
    pub const RESOURCE_PROPERTY: PageProfile = PageProfile {
        labels: &[REQUIRED_LABEL, TYPE_LABEL],
        attributes: false,
        samples: false,
        source_url: false,
    };

    pub fn tracks_update_policy(&self) -> bool {
        self.labels.contains(&UPDATE_LABEL)
    }
}

/// Extract one resource record from a loaded page.
///
/// `anchor` is the id of the element naming the resource; `source_url` is
/// recorded when the profile asks for it.
pub fn extract(
    doc: &Document,
    anchor: &str,
    source_url: &str,
    profile: &PageProfile,
) -> Result<ResourceRecord, ExtractError> {
    let title = dom::element_by_id(doc, anchor).ok_or(ExtractError::MissingName)?;
    let name = dom::clean_text(&title);
    if name.is_empty() {
        return Err(ExtractError::MissingName);
    }

    let description = dom::next_element(&title)
        .map(|p| dom::clean_text(&p))
        .unwrap_or_default();

    let mut properties = Vec::new();
    let mut attributes = Vec::new();

    for (position, block) in blocks::collect_blocks(doc).iter().enumerate() {
        match block.kind {
            BlockKind::Property => {
                let entries = blocks::pair_entries(&block.node, position, &name)?;
                properties.extend(entries.iter().map(|e| property_from(e, profile)));
            }
            BlockKind::Attribute if profile.attributes => {
                let entries = blocks::pair_entries(&block.node, position, &name)?;
                attributes.extend(entries.into_iter().map(attribute_from));
            }
            BlockKind::Attribute => {}
        }
    }

    if properties.is_empty() {
        return Err(ExtractError::EmptyProperties { resource: name });
    }

    let (json_sample, yaml_sample) = if profile.samples {
        (
            Some(first_listing(doc, JSON_CONTAINER)),
            Some(first_listing(doc, YAML_CONTAINER)),
        )
    } else {
        (None, None)
    };

    Ok(ResourceRecord {
        name,
        description,
        source_url: profile.source_url.then(|| source_url.to_string()),
        json_sample,
        yaml_sample,
        properties,
        return_values: profile.attributes.then_some(attributes),
    })
}

fn property_from(entry: &Entry, profile: &PageProfile) -> PropertyRecord {
    let fields = parse_fields(&entry.body, profile.labels);
    PropertyRecord {
        name: entry.term.clone(),
        description: fields.rest_value(),
        field_type: fields.value(TYPE_LABEL),
        required: fields.value(REQUIRED_LABEL),
        update_policy: profile
            .tracks_update_policy()
            .then(|| fields.value(UPDATE_LABEL)),
    }
}

fn attribute_from(entry: Entry) -> AttributeRecord {
    AttributeRecord {
        name: entry.term,
        description: normalize(&entry.body),
    }
}

/// Raw text of the first code listing under any element with id
/// `container`; empty when there is none.
fn first_listing(doc: &Document, container: &str) -> String {
    dom::elements_by_id(doc, container)
        .iter()
        .flat_map(|c| dom::select_all(c, LISTING_SELECTOR))
        .next()
        .map(|listing| dom::text(&listing))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET_PAGE: &str = r#"<html><body>
        <h1 id="aws-resource-s3-bucket">AWS::S3::Bucket</h1>
        <div class="variablelist"><dl>
            <dt>BucketName</dt>
            <dd>The name of the bucket. Required: No Type: String</dd>
        </dl></div>
    </body></html>"#;

    fn load(name: &str) -> Document {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        Document::from(html.as_str())
    }

    #[test]
    fn bucket_end_to_end() {
        let doc = Document::from(BUCKET_PAGE);
        let r = extract(
            &doc,
            "aws-resource-s3-bucket",
            "http://x/aws-resource-s3-bucket.html",
            &PageProfile::RESOURCE_PROPERTY,
        )
        .unwrap();

        assert_eq!(r.name, "AWS::S3::Bucket");
        assert_eq!(
            r.properties,
            vec![PropertyRecord {
                name: "BucketName".into(),
                description: "The name of the bucket.".into(),
                field_type: "String".into(),
                required: "No".into(),
                update_policy: None,
            }]
        );
        assert_eq!(r.return_values, None);
        assert_eq!(r.source_url, None);
        assert_eq!(r.json_sample, None);
    }

    #[test]
    fn template_profile_on_minimal_page() {
        let doc = Document::from(BUCKET_PAGE);
        let r = extract(
            &doc,
            "aws-resource-s3-bucket",
            "http://x/aws-resource-s3-bucket.html",
            &PageProfile::TEMPLATE_RESOURCE,
        )
        .unwrap();

        assert_eq!(r.return_values, Some(Vec::new()));
        assert_eq!(r.json_sample.as_deref(), Some(""));
        assert_eq!(r.yaml_sample.as_deref(), Some(""));
        assert_eq!(r.source_url.as_deref(), Some("http://x/aws-resource-s3-bucket.html"));
        assert_eq!(r.properties[0].update_policy.as_deref(), Some(""));
    }

    #[test]
    fn missing_title() {
        let doc = Document::from(BUCKET_PAGE);
        let err = extract(&doc, "aws-resource-other", "", &PageProfile::TEMPLATE_RESOURCE);
        assert_eq!(err, Err(ExtractError::MissingName));
    }

    #[test]
    fn blank_title() {
        let doc = Document::from(r#"<h1 id="t">  </h1><div class="variablelist"><dl><dt>A</dt><dd>Required: Yes</dd></dl></div>"#);
        let err = extract(&doc, "t", "", &PageProfile::RESOURCE_PROPERTY);
        assert_eq!(err, Err(ExtractError::MissingName));
    }

    #[test]
    fn no_property_block() {
        let doc = Document::from(
            r#"<h1 id="t">AWS::X::Y</h1>
               <div class="variablelist"><dl><dt>Arn</dt><dd>The ARN.</dd></dl></div>"#,
        );
        let err = extract(&doc, "t", "", &PageProfile::TEMPLATE_RESOURCE);
        assert_eq!(
            err,
            Err(ExtractError::EmptyProperties {
                resource: "AWS::X::Y".into()
            })
        );
    }

    #[test]
    fn malformed_property_block() {
        let doc = Document::from(
            r#"<h1 id="t">AWS::X::Y</h1>
               <div class="variablelist"><dl><dt>A</dt><dt>B</dt><dd>Required: Yes</dd></dl></div>"#,
        );
        let err = extract(&doc, "t", "", &PageProfile::RESOURCE_PROPERTY).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedBlock { terms: 2, bodies: 1, .. }));
    }

    #[test]
    fn malformed_attribute_block_ignored_without_attributes() {
        let doc = Document::from(
            r#"<h1 id="t">AWS::X::Y</h1>
               <div class="variablelist"><dl><dt>A</dt><dd>Required: Yes</dd></dl></div>
               <div class="variablelist"><dl><dt>Arn</dt><dt>Id</dt><dd>x</dd></dl></div>"#,
        );
        assert!(extract(&doc, "t", "", &PageProfile::RESOURCE_PROPERTY).is_ok());
        assert!(extract(&doc, "t", "", &PageProfile::TEMPLATE_RESOURCE).is_err());
    }

    #[test]
    fn nested_property_list_not_duplicated() {
        let doc = Document::from(
            r#"<h1 id="t">AWS::X::Y</h1>
               <div class="variablelist"><dl>
                 <dt>Outer</dt>
                 <dd><p>Outer desc.</p><p>Required: Yes</p><p>Type: Settings</p>
                   <div class="variablelist"><dl>
                     <dt>Inner</dt>
                     <dd><p>Inner desc.</p><p>Required: No</p><p>Type: String</p></dd>
                   </dl></div>
                 </dd>
               </dl></div>"#,
        );
        let r = extract(&doc, "t", "", &PageProfile::RESOURCE_PROPERTY).unwrap();

        let names: Vec<&str> = r.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
        assert_eq!(r.properties[0].description, "Outer desc.");
        assert_eq!(r.properties[0].field_type, "Settings");
        assert_eq!(r.properties[0].required, "Yes");
        assert_eq!(r.properties[1].description, "Inner desc.");
        assert_eq!(r.properties[1].field_type, "String");
    }

    #[test]
    fn sample_from_later_container_with_same_id() {
        let doc = Document::from(
            r#"<h1 id="t">AWS::X::Y</h1>
               <div id="JSON"><h3>JSON</h3></div>
               <div id="JSON"><pre class="programlisting">{ "Type" : "AWS::X::Y" }</pre>
                 <pre class="programlisting">ignored</pre></div>
               <div class="variablelist"><dl><dt>A</dt><dd>Required: Yes</dd></dl></div>"#,
        );
        let r = extract(&doc, "t", "", &PageProfile::TEMPLATE_RESOURCE).unwrap();
        assert_eq!(r.json_sample.as_deref(), Some(r#"{ "Type" : "AWS::X::Y" }"#));
        assert_eq!(r.yaml_sample.as_deref(), Some(""));
    }

    #[test]
    fn template_fixture() {
        let doc = load("aws-resource-logs-loggroup");
        let r = extract(
            &doc,
            "aws-resource-logs-loggroup",
            "http://x/aws-resource-logs-loggroup.html",
            &PageProfile::TEMPLATE_RESOURCE,
        )
        .unwrap();

        assert_eq!(r.name, "AWS::Logs::LogGroup");
        assert_eq!(
            r.description,
            "The AWS::Logs::LogGroup resource creates an Amazon CloudWatch Logs log group."
        );

        let names: Vec<&str> = r.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["LogGroupName", "RetentionInDays", "Tags"]);

        let retention = &r.properties[1];
        assert_eq!(
            retention.description,
            "The number of days to retain the log events in the specified log group."
        );
        assert_eq!(retention.required, "No");
        assert_eq!(retention.field_type, "Integer");
        assert_eq!(retention.update_policy.as_deref(), Some("No interruption"));

        assert_eq!(r.properties[2].field_type, "List of Tag");

        let json = r.json_sample.unwrap();
        assert!(json.contains("\"Type\" : \"AWS::Logs::LogGroup\""));
        assert!(json.contains('\n'), "samples keep their line breaks");
        assert!(!json.contains("second-json-listing"));
        assert!(r.yaml_sample.unwrap().contains("Type: AWS::Logs::LogGroup"));

        let attrs = r.return_values.unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "Arn");
        assert_eq!(attrs[0].description, "The ARN of the log group.");
    }

    #[test]
    fn property_fixture() {
        let doc = load("aws-properties-logs-loggroup-tag");
        let r = extract(
            &doc,
            "aws-properties-logs-loggroup-tag",
            "",
            &PageProfile::RESOURCE_PROPERTY,
        )
        .unwrap();

        assert_eq!(r.name, "AWS::Logs::LogGroup Tag");
        assert_eq!(r.properties.len(), 2);
        assert_eq!(r.properties[0].name, "Key");
        assert_eq!(r.properties[0].required, "Yes");
        assert_eq!(r.properties[0].field_type, "String");
        // "Update requires:" is not a label for property pages, so it stays in the type run.
        assert_eq!(r.properties[1].field_type, "String Update requires: No interruption");
        assert!(r.properties.iter().all(|p| p.update_policy.is_none()));
    }
}
