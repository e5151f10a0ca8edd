//! Unmarshal/marshal tests over whole documents

use chrono::{TimeZone, Utc};
use ssds_metadata::xml::parse_str;
use ssds_metadata::*;

fn deployment() -> DataProducer {
    let mut record = RecordDescription {
        record_type: Some(1),
        buffer_style: Some("ASCII".to_string()),
        buffer_item_separator: Some(",".to_string()),
        parseable: Some(true),
        ..Default::default()
    };
    for (index, name) in ["time", "temperature"].iter().enumerate() {
        let mut variable = RecordVariable::named(*name);
        variable.column_index = Some(index as i64);
        variable.units = Some(if index == 0 { "s" } else { "degC" }.to_string());
        record.record_variables.push(variable);
    }

    let mut output = DataContainer::new(DataContainerType::File);
    output.name = Some("ctd-2004.dat".to_string());
    output.uri_string = Some("http://ssds.mbari.org/data/ctd-2004.dat".to_string());
    output.description = Some("Raw CTD data".to_string());
    output.original = Some(true);
    output.min_latitude = Some(36.7);
    output.max_depth = Some(250.5);
    output.start_date = Some(Utc.with_ymd_and_hms(2004, 6, 1, 0, 0, 0).unwrap());
    output.record_description = Some(record);
    output.keywords.push(Keyword::named("ctd"));

    let mut person = Person::with_username("kgomes");
    person.email = Some("kgomes@mbari.org".to_string());
    person.user_groups.push(UserGroup::named("admin"));

    let mut deployment = DataProducer::new(DataProducerType::Deployment);
    deployment.name = Some("M1 CTD".to_string());
    deployment.description = Some("CTD on the M1 mooring".to_string());
    deployment.role = Some("instrument".to_string());
    deployment.start_date = Some(Utc.with_ymd_and_hms(2004, 6, 1, 12, 30, 0).unwrap());
    deployment.nominal_latitude = Some(36.75);
    deployment.nominal_depth = Some(10.0);
    deployment.version = Version(3);
    deployment.device = Some(Device {
        uuid: Some("dev-1234".to_string()),
        name: Some("SBE 37".to_string()),
        device_type: Some(DeviceType::named("CTD")),
        ..Default::default()
    });
    deployment.person = Some(person);
    deployment.events.push(Event {
        name: Some("recovered".to_string()),
        start_date: Some(Utc.with_ymd_and_hms(2004, 9, 1, 8, 0, 0).unwrap()),
        ..Default::default()
    });
    deployment.outputs.push(output);
    deployment
}

fn child_tags(element: &xml::XmlElement) -> Vec<&str> {
    element.children.iter().map(|c| c.name.as_str()).collect()
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_current_dialect_round_trip() {
        let original = deployment();
        let config = MarshalConfig::default();
        let xml = serialize_document(&[original.clone().into()], &config).unwrap();
        assert!(xml.contains("<DataProducer "));
        assert!(xml.contains("dataProducerType=\"Deployment\""));

        let parsed = parse_document(&xml, &config).unwrap();
        let producers = parsed.list_data_producers();
        assert_eq!(producers.len(), 1);
        assert_eq!(*producers[0], original);
    }

    #[test]
    fn test_legacy_dialect_round_trip() {
        let mut original = deployment();
        // The legacy DataFile element has no Keyword children.
        original.outputs[0].keywords.clear();
        let config = MarshalConfig::builder().legacy(true).build();
        let xml = serialize_document(&[original.clone().into()], &config).unwrap();
        assert!(xml.contains("<Deployment "));
        assert!(xml.contains("<DataFile "));
        assert!(!xml.contains("dataProducerType"));

        let parsed = parse_document(&xml, &MarshalConfig::default()).unwrap();
        assert_eq!(*parsed.list_data_producers()[0], original);
    }

    #[test]
    fn test_container_root_round_trips_consumers() {
        let mut qc = DataProducer::new(DataProducerType::ProcessRun);
        qc.name = Some("quality control".to_string());
        qc.software = Some(Software {
            name: Some("qc.py".to_string()),
            software_version: Some("2.1".to_string()),
            ..Default::default()
        });
        let mut stream = DataContainer::new(DataContainerType::Stream);
        stream.uri_string = Some("udp://m1:4001".to_string());
        stream.consumers.push(qc);

        for legacy in [false, true] {
            let config = MarshalConfig::builder().legacy(legacy).build();
            let xml = serialize_document(&[stream.clone().into()], &config).unwrap();
            assert_eq!(xml.contains("<destiny>"), legacy);
            let parsed = parse_document(&xml, &config).unwrap();
            let containers = parsed.get(EntityKind::DataContainer);
            assert_eq!(containers[0].as_data_container(), Some(&stream));
        }
    }

    #[test]
    fn test_every_kind_round_trips() {
        let mut header = HeaderDescription {
            description: Some("Two header lines".to_string()),
            byte_offset: Some(128),
            num_header_lines: Some(2),
            ..Default::default()
        };
        header.comment_tags.push(CommentTag::new("#"));
        header.comment_tags.push(CommentTag::new("%"));

        let mut variable = RecordVariable::named("sea_water_temperature");
        variable.column_index = Some(1);
        variable.standard_domain = Some(StandardDomain {
            name: Some("ocean".to_string()),
            description: Some("Physical oceanography".to_string()),
            ..Default::default()
        });
        variable.standard_keyword = Some(StandardKeyword {
            name: Some("temperature".to_string()),
            ..Default::default()
        });
        variable.standard_reference_scale = Some(StandardReferenceScale {
            name: Some("ITS-90".to_string()),
            ..Default::default()
        });
        variable.standard_unit = Some(StandardUnit {
            long_name: Some("degrees Celsius".to_string()),
            symbol: Some("degC".to_string()),
            ..StandardUnit::named("celsius")
        });
        variable.standard_variable = Some(StandardVariable {
            name: Some("sea_water_temperature".to_string()),
            namespace_uri_string: Some("http://cf-pcmdi.llnl.gov".to_string()),
            reference_scale: Some("ITS-90".to_string()),
            standard_units: vec![StandardUnit::named("celsius"), StandardUnit::named("kelvin")],
            ..Default::default()
        });
        let record = RecordDescription {
            record_type: Some(1),
            record_variables: vec![variable],
            ..Default::default()
        };

        let mut readme = Resource {
            name: Some("readme".to_string()),
            uri_string: Some("http://x/readme.txt".to_string()),
            mime_type: Some("text/plain".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2004, 6, 2, 0, 0, 0).unwrap()),
            resource_type: Some(ResourceType::named("documentation")),
            ..Default::default()
        };
        readme.keywords.push(Keyword::named("ctd"));
        readme.keywords.push(Keyword::named("m1"));

        let mut file = DataContainer::new(DataContainerType::File);
        file.uri_string = Some("http://x/ctd.dat".to_string());
        file.header_description = Some(header);
        file.record_description = Some(record);
        file.data_container_groups.push(DataContainerGroup::named("M1 files"));
        file.resources.push(readme);

        let mut producer = DataProducer::new(DataProducerType::ProcessRun);
        producer.name = Some("calibration".to_string());
        producer.data_producer_groups.push(DataProducerGroup::named("calibrations"));
        producer.data_producer_groups.push(DataProducerGroup::named("2004"));
        producer.software = Some(Software {
            name: Some("calibrate".to_string()),
            software_version: Some("1.4.2".to_string()),
            uri_string: Some("http://x/calibrate.tar.gz".to_string()),
            ..Default::default()
        });

        let config = MarshalConfig::default();
        let entities: Vec<Entity> = vec![file.clone().into(), producer.clone().into()];
        let xml = serialize_document(&entities, &config).unwrap();
        assert!(xml.contains("<CommentTag tagString=\"%\"/>"));
        assert!(xml.contains("softwareVersion=\"1.4.2\""));

        let parsed = parse_document(&xml, &config).unwrap();
        assert_eq!(
            parsed.get(EntityKind::DataContainer)[0].as_data_container(),
            Some(&file)
        );
        assert_eq!(*parsed.list_data_producers()[0], producer);
    }
}

mod ordering_tests {
    use super::*;

    #[test]
    fn test_current_data_container_child_order() {
        let mut container = deployment().outputs.remove(0);
        container.person = Some(Person::with_username("kgomes"));
        container.resources.push(Resource {
            uri_string: Some("http://x/readme".to_string()),
            ..Default::default()
        });
        container.data_container_groups.push(DataContainerGroup::named("M1"));
        container.header_description = Some(HeaderDescription {
            num_header_lines: Some(2),
            ..Default::default()
        });
        container.consumers.push(DataProducer::new(DataProducerType::ProcessRun));

        let mut builder = XmlBuilder::default();
        builder.add(container);
        let root = builder.marshal();
        assert_eq!(
            child_tags(&root.children[0]),
            [
                "consumer",
                "description",
                "DataContainerGroup",
                "HeaderDescription",
                "Keyword",
                "Person",
                "RecordDescription",
                "Resource",
            ]
        );
    }

    #[test]
    fn test_legacy_deployment_child_order() {
        let mut producer = deployment();
        producer.resources.push(Resource {
            uri_string: Some("http://x/manual.pdf".to_string()),
            ..Default::default()
        });
        producer.child_data_producers.push(DataProducer {
            name: Some("thermistor".to_string()),
            ..DataProducer::new(DataProducerType::Deployment)
        });

        let mut builder = XmlBuilder::new(MarshalConfig::builder().legacy(true).build());
        builder.add(producer);
        let root = builder.marshal();
        assert_eq!(
            child_tags(&root.children[0]),
            [
                "Device",
                "Deployment",
                "Person",
                "description",
                "Resource",
                "Event",
                "output"
            ]
        );
    }

    #[test]
    fn test_record_variable_order() {
        let mut record = RecordDescription::default();
        for (name, index) in [("b", Some(2)), ("a", Some(0)), ("free", None)] {
            let mut variable = RecordVariable::named(name);
            variable.column_index = index;
            record.record_variables.push(variable);
        }
        let mut builder = XmlBuilder::default();
        builder.add(record);
        let root = builder.marshal();
        let names: Vec<_> = root.children[0]
            .children
            .iter()
            .map(|v| v.attribute("name").unwrap())
            .collect();
        assert_eq!(names, ["a", "b", "free"]);
    }
}

mod legacy_tests {
    use super::*;

    #[test]
    fn test_legacy_aliases_resolve() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Metadata>
    <ProcessRun name="merge" startDate="2005/01/02 03:04:05Z">
        <output>
            <DataStream name="merged" url="http://x/merged">
                <destiny><Deployment name="downstream"/></destiny>
            </DataStream>
        </output>
    </ProcessRun>
</Metadata>"#;
        let parsed = parse_document(xml, &MarshalConfig::default()).unwrap();
        let run = parsed.list_data_producers()[0];
        assert_eq!(run.data_producer_type, Some(DataProducerType::ProcessRun));
        assert_eq!(
            run.start_date,
            Some(Utc.with_ymd_and_hms(2005, 1, 2, 3, 4, 5).unwrap())
        );
        let stream = &run.outputs[0];
        assert_eq!(stream.data_container_type, Some(DataContainerType::Stream));
        assert_eq!(stream.uri_string.as_deref(), Some("http://x/merged"));
        assert_eq!(stream.consumers[0].name.as_deref(), Some("downstream"));
    }

    #[test]
    fn test_current_to_legacy_conversion() {
        let xml = r#"<Metadata>
    <DataProducer name="m1" dataProducerType="ProcessRun">
        <output><DataContainer dataContainerType="Stream" uriString="u"/></output>
    </DataProducer>
</Metadata>"#;
        let config = MarshalConfig::default();
        let parsed = parse_document(xml, &config).unwrap();
        let legacy = serialize_document(
            &parsed.into_entities(),
            &MarshalConfig::builder().legacy(true).build(),
        )
        .unwrap();
        let root = parse_str(&legacy).unwrap();
        assert_eq!(root.children[0].name, "ProcessRun");
        assert_eq!(root.children[0].children[0].children[0].name, "DataStream");
    }
}

mod coercion_tests {
    use super::*;

    #[test]
    fn test_bad_version_is_not_fatal() {
        let xml = r#"<Metadata><Device uuid="d1" version="not-a-number"/></Metadata>"#;
        let mut builder = ObjectBuilder::default();
        let parsed = builder.unmarshal(xml).unwrap();
        assert!(!builder.did_unmarshal_fail());
        assert_eq!(parsed.list_devices()[0].version, Version::UNKNOWN);
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let xml = r#"<Metadata><Event name="e" startDate="not-a-date"/></Metadata>"#;
        let mut builder = ObjectBuilder::default();
        let err = builder.unmarshal(xml).unwrap_err();
        assert!(matches!(err, MetadataError::Conversion { .. }));
        assert!(builder.did_unmarshal_fail());
        assert!(builder.error_message().contains("startDate"));
    }

    #[test]
    fn test_overflowing_date_is_conversion_error() {
        let xml = r#"<Metadata><Event name="e" startDate="2000-01-01T9999999999:00:00"/></Metadata>"#;
        let err = parse_document(xml, &MarshalConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::Conversion { ref field, .. } if field == "startDate"
        ));

        let config = MarshalConfig::builder().validate(true).build();
        let err = parse_document(xml, &config).unwrap_err();
        assert_eq!(err.validity_errors().len(), 1);
    }

    #[test]
    fn test_bad_version_fatal_in_strict_mode() {
        let xml = r#"<Metadata><Device uuid="d1" version="x"/></Metadata>"#;
        let config = MarshalConfig::builder().strict().build();
        assert!(parse_document(xml, &config).is_err());
    }

    #[test]
    fn test_blob_round_trip() {
        let resource = Resource {
            uri_string: Some("http://x/cal.bin".to_string()),
            resource_blob: Some(ResourceBlob {
                name: Some("cal".to_string()),
                byte_array: Some(vec![0, 1, 2, 254, 255]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = MarshalConfig::default();
        let xml = serialize_document(&[resource.clone().into()], &config).unwrap();
        assert!(xml.contains("byteArray=\"AAEC/v8=\""));
        let parsed = parse_document(&xml, &config).unwrap();
        assert_eq!(parsed.get(EntityKind::Resource)[0], Entity::Resource(resource));
    }
}

mod document_tests {
    use super::*;

    #[test]
    fn test_duplicate_keyword_suppressed() {
        let xml = r#"<Metadata>
    <DataContainer uriString="u1">
        <Keyword name="ctd"/>
        <Keyword name="ctd"/>
    </DataContainer>
</Metadata>"#;
        let parsed = parse_document(xml, &MarshalConfig::default()).unwrap();
        let container = parsed.get(EntityKind::DataContainer)[0]
            .as_data_container()
            .unwrap();
        assert_eq!(container.keywords, vec![Keyword::named("ctd")]);
    }

    #[test]
    fn test_duplicate_top_level_suppressed() {
        let xml = r#"<Metadata><Device uuid="d1"/><Device uuid="d1" name="again"/></Metadata>"#;
        let parsed = parse_document(xml, &MarshalConfig::default()).unwrap();
        assert_eq!(parsed.list_devices().len(), 1);
        assert_eq!(parsed.list_devices()[0].name, None);
    }

    #[test]
    fn test_data_producer_group_inversion() {
        let xml = r#"<Metadata>
    <DataProducerGroup name="G">
        <Deployment id="1"/>
    </DataProducerGroup>
</Metadata>"#;
        let parsed = parse_document(xml, &MarshalConfig::default()).unwrap();
        assert!(parsed.get(EntityKind::DataProducerGroup).is_empty());
        let producers = parsed.list_data_producers();
        assert_eq!(producers.len(), 1);
        assert_eq!(producers[0].id, Some(1));
        assert_eq!(
            producers[0].data_producer_groups,
            vec![DataProducerGroup::named("G")]
        );
    }

    #[test]
    fn test_childless_group_is_not_inverted() {
        let xml = r#"<Metadata><DataProducerGroup name="G"/></Metadata>"#;
        let parsed = parse_document(xml, &MarshalConfig::default()).unwrap();
        assert_eq!(
            parsed.get(EntityKind::DataProducerGroup),
            [Entity::DataProducerGroup(DataProducerGroup::named("G"))]
        );
        assert!(parsed.list_data_producers().is_empty());
    }

    #[test]
    fn test_no_inversion_next_to_other_children() {
        let xml = r#"<Metadata>
    <DataProducerGroup name="G"><Deployment id="1"/></DataProducerGroup>
    <Keyword name="k"/>
</Metadata>"#;
        let mut builder = ObjectBuilder::default();
        let parsed = builder.unmarshal(xml).unwrap();
        assert_eq!(parsed.get(EntityKind::DataProducerGroup).len(), 1);
        assert!(parsed.list_data_producers().is_empty());
    }

    #[test]
    fn test_description_edges_trimmed() {
        let mut keyword = Keyword::named("ctd");
        keyword.description = Some("  conductivity,\n  temperature  ".to_string());
        let config = MarshalConfig::default();
        let xml = serialize_document(&[keyword.into()], &config).unwrap();
        let parsed = parse_document(&xml, &config).unwrap();
        let Entity::Keyword(keyword) = &parsed.get(EntityKind::Keyword)[0] else {
            panic!("expected a Keyword");
        };
        assert_eq!(
            keyword.description.as_deref(),
            Some("conductivity,\n  temperature")
        );
    }

    #[test]
    fn test_empty_person_omitted() {
        let mut builder = XmlBuilder::default();
        builder.add(Person::default());
        let mut producer = DataProducer::new(DataProducerType::Deployment);
        producer.person = Some(Person::default());
        builder.add(producer);
        let root = builder.marshal();
        assert_eq!(child_tags(&root), ["DataProducer"]);
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn test_root_must_be_metadata() {
        let err = parse_document("<Deployment/>", &MarshalConfig::default()).unwrap_err();
        assert!(matches!(err, MetadataError::SchemaMismatch { .. }));
    }
}

mod validity_tests {
    use super::*;

    #[test]
    fn test_every_validity_error_reported() {
        let xml = "<Metadata>\n<Device id=\"one\"/>\n<DataFile original=\"maybe\"/>\n<Spaceship/>\n</Metadata>";
        let config = MarshalConfig::builder().validate(true).build();
        let mut builder = ObjectBuilder::new(config);
        let err = builder.unmarshal(xml).unwrap_err();
        let problems = err.validity_errors();
        assert_eq!(problems.len(), 3);
        assert_eq!(
            problems.iter().map(|p| p.line).collect::<Vec<_>>(),
            [2, 3, 4]
        );
        let report = builder.error_message();
        assert!(report.contains("line 2"));
        assert!(report.contains("line 4"));
    }

    #[test]
    fn test_unknown_element_lenient_vs_strict() {
        let xml = r#"<Metadata><Spaceship/><Keyword name="k"/></Metadata>"#;
        let mut lenient = ObjectBuilder::default();
        let parsed = lenient.unmarshal(xml).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(lenient.errors.len(), 1);

        let mut strict = ObjectBuilder::new(MarshalConfig::builder().strict().build());
        assert!(matches!(
            strict.unmarshal(xml),
            Err(MetadataError::UnknownConstruct { .. })
        ));
    }

    #[test]
    fn test_entity_values_checked() {
        let mut producer = deployment();
        producer.nominal_latitude = Some(123.0);
        let findings = validation::validate_entity(&producer.into());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].to_string().contains("nominalLatitude"));
    }
}

mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "legacy = true\nmode = \"strict\"\npretty = false").unwrap();
        let config = MarshalConfig::from_toml_file(file.path()).unwrap();
        assert!(config.legacy);
        assert!(config.is_strict());
        assert!(!config.validate);

        let xml = serialize_document(&[deployment().into()], &config).unwrap();
        assert!(!xml.contains('\n'));
        assert!(xml.contains("<Deployment "));
    }

    #[test]
    fn test_bad_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "legacy = \"yes please\"").unwrap();
        assert!(matches!(
            MarshalConfig::from_toml_file(file.path()),
            Err(MetadataError::Config(_))
        ));
    }
}

mod dao_tests {
    use super::*;

    #[test]
    fn test_persist_parsed_document() {
        let config = MarshalConfig::default();
        let xml = serialize_document(&[deployment().into()], &config).unwrap();
        let parsed = parse_document(&xml, &config).unwrap();

        let mut dao = InMemoryDao::new();
        for entity in parsed.into_entities() {
            dao.make_persistent(entity).unwrap();
        }
        let transient: Entity = deployment().into();
        let id = dao.find_id(&transient).unwrap().unwrap();
        let stored = dao.find_by_id(EntityKind::DataProducer, id).unwrap().unwrap();
        assert_eq!(
            stored.as_data_producer().unwrap().name.as_deref(),
            Some("M1 CTD")
        );
    }
}
