//! Integration tests for the object model: factories, casts, serialization,
//! copies, and identity semantics.

use bytes::Bytes;
use pdf_objects::{Document, Error, ObjGen, Object, TypeCode};
use serde_json::json;

mod type_tests {
    use super::*;

    #[test]
    fn test_type_codes_and_names() {
        assert_eq!(Object::null().type_code(), TypeCode::Null);
        assert_eq!(Object::boolean(true).type_name(), "boolean");
        assert_eq!(Object::real(1.5).type_name(), "real");
        assert_eq!(Object::array(vec![]).type_name(), "array");
        assert_eq!(Object::dictionary(vec![]).type_name(), "dictionary");
        assert_eq!(Object::operator("Tj").type_name(), "operator");
        assert_eq!(
            Object::inline_image(Bytes::from_static(b"BI")).type_name(),
            "inline-image"
        );
    }

    #[test]
    fn test_raw_type_code_sees_the_edge() {
        let doc = Document::new();
        doc.replace_object(ObjGen::new(1, 0), &Object::integer(5))
            .unwrap();
        let edge = doc.reference(ObjGen::new(1, 0));
        // transparent forwarding for the resolved code, literal arm raw
        assert_eq!(edge.type_code(), TypeCode::Integer);
        assert_eq!(edge.raw_type_code(), TypeCode::Reference);
        assert_eq!(edge.type_name(), "integer");
    }

    #[test]
    fn test_casts_forward_through_edges() {
        let doc = Document::new();
        doc.replace_object(ObjGen::new(1, 0), &Object::name("Pages"))
            .unwrap();
        let edge = doc.reference(ObjGen::new(1, 0));
        assert_eq!(edge.as_name(), Some("Pages".to_string()));
        assert!(edge.as_i64().is_none());
    }
}

mod serialization_tests {
    use super::*;

    #[test]
    fn test_unparse_each_kind() {
        assert_eq!(Object::null().unparse().unwrap(), "null");
        assert_eq!(Object::boolean(true).unparse().unwrap(), "true");
        assert_eq!(Object::integer(42).unparse().unwrap(), "42");
        assert_eq!(Object::real(2.5).unparse().unwrap(), "2.5");
        assert_eq!(Object::string(b"Hi".to_vec()).unparse().unwrap(), "(Hi)");
        assert_eq!(Object::name("Type").unparse().unwrap(), "/Type");
        assert_eq!(
            Object::array(vec![Object::integer(1), Object::integer(2)])
                .unparse()
                .unwrap(),
            "[ 1 2 ]"
        );
        assert_eq!(
            Object::dictionary(vec![("A", Object::integer(3))])
                .unparse()
                .unwrap(),
            "<< /A 3 >>"
        );
    }

    #[test]
    fn test_indirect_children_unparse_as_references() {
        let doc = Document::new();
        let target = doc.make_indirect(&Object::integer(9)).unwrap();
        let arr = Object::array(vec![Object::integer(1), target]);
        assert_eq!(arr.unparse().unwrap(), "[ 1 1 0 R ]");

        let edge = doc.reference(ObjGen::new(1, 0));
        let dict = Object::dictionary(vec![("Next", edge)]);
        assert_eq!(dict.unparse().unwrap(), "<< /Next 1 0 R >>");
    }

    #[test]
    fn test_json_version_split() {
        let name = Object::name("A B");
        assert_eq!(name.to_json(1).unwrap(), json!("/A#20B"));
        assert_eq!(name.to_json(2).unwrap(), json!("/A B"));

        // UTF-16BE text string decodes in version 1
        let text = Object::string(vec![0xFE, 0xFF, 0x00, b'H', 0x00, b'i']);
        assert_eq!(text.to_json(1).unwrap(), json!("Hi"));
    }

    #[test]
    fn test_json_containers() {
        let doc = Document::new();
        let obj = doc
            .parse_object(b"<< /Kids [3 0 R] /Count 1 /Ratio .5 >>")
            .unwrap();
        assert_eq!(
            obj.to_json(2).unwrap(),
            json!({
                "/Count": 1,
                "/Kids": ["3 0 R"],
                "/Ratio": 0.5,
            })
        );
    }

    #[test]
    fn test_json_stream_wraps_dict() {
        let stream = Object::stream(
            Object::dictionary(vec![("Type", Object::name("XObject"))]),
            Bytes::from_static(b"data"),
        )
        .unwrap();
        assert_eq!(
            stream.to_json(2).unwrap(),
            json!({"dict": {"/Length": 4, "/Type": "/XObject"}})
        );
    }

    #[test]
    fn test_operator_and_inline_image_json_is_null() {
        assert_eq!(Object::operator("Tj").to_json(2).unwrap(), json!(null));
        assert_eq!(
            Object::inline_image(Bytes::from_static(b"x")).to_json(2).unwrap(),
            json!(null)
        );
    }
}

mod copy_tests {
    use super::*;

    #[test]
    fn test_deep_copy_independence() {
        let doc = Document::new();
        let container = doc
            .parse_object(b"<< /Box [1 2 3] /Name (x) >>")
            .unwrap();
        let copy = container.copy(false).unwrap();

        copy.get_key("Box").unwrap().set_item(0, &Object::integer(9)).unwrap();
        copy.replace_key("Name", &Object::string(b"y".to_vec())).unwrap();

        assert_eq!(container.unparse().unwrap(), "<< /Box [ 1 2 3 ] /Name (x) >>");
        assert_eq!(copy.unparse().unwrap(), "<< /Box [ 9 2 3 ] /Name (y) >>");
    }

    #[test]
    fn test_shallow_copy_shares_indirect_edges() {
        let doc = Document::new();
        let target = doc.make_indirect(&Object::integer(5)).unwrap();
        let edge = doc.reference(target.obj_gen());
        let container = Object::array(vec![edge]);

        let copy = container.copy(true).unwrap();
        assert!(Object::ptr_eq(&container.at(0), &copy.at(0)));
        // both edges resolve to the same target identity
        assert!(Object::ptr_eq(
            &container.at(0).copy(true).unwrap(),
            &copy.at(0).copy(true).unwrap()
        ));
    }

    #[test]
    fn test_deep_copy_keeps_indirect_children_shared() {
        let doc = Document::new();
        let target = doc.make_indirect(&Object::integer(5)).unwrap();
        let container = Object::array(vec![target.clone(), Object::integer(1)]);

        let copy = container.copy(false).unwrap();
        assert!(Object::ptr_eq(&copy.at(0), &target));
        assert!(!Object::ptr_eq(&copy.at(1), &container.at(1)));
    }

    #[test]
    fn test_copy_of_reference_is_the_target() {
        let doc = Document::new();
        let target = doc.make_indirect(&Object::integer(5)).unwrap();
        let edge = doc.reference(target.obj_gen());
        assert!(Object::ptr_eq(&edge.copy(true).unwrap(), &target));
        assert!(Object::ptr_eq(&edge.copy(false).unwrap(), &target));
    }

    #[test]
    fn test_copies_are_unowned() {
        let doc = Document::new();
        let obj = doc.make_indirect(&Object::integer(5)).unwrap();
        let copy = obj.copy(true).unwrap();
        assert!(copy.document().is_none());
        assert!(!copy.is_indirect());
    }
}

mod identity_tests {
    use super::*;

    #[test]
    fn test_assign_reaches_every_handle() {
        let shared = Object::integer(1);
        let container_a = Object::array(vec![shared.clone()]);
        let container_b = Object::array(vec![shared.clone()]);

        shared.assign(&Object::name("Both"));
        assert_eq!(container_a.unparse().unwrap(), "[ /Both ]");
        assert_eq!(container_b.unparse().unwrap(), "[ /Both ]");
    }

    #[test]
    fn test_swap_preserves_obj_gen() {
        let doc = Document::new();
        let a = doc.make_indirect(&Object::integer(1)).unwrap();
        let b = doc.make_indirect(&Object::integer(2)).unwrap();
        let (og_a, og_b) = (a.obj_gen(), b.obj_gen());
        a.swap_with(&b);
        assert_eq!(a.obj_gen(), og_a);
        assert_eq!(b.obj_gen(), og_b);
        assert_eq!(a.as_i64(), Some(2));
    }

    #[test]
    fn test_metadata_plumbing() {
        let obj = Object::integer(1);
        assert_eq!(obj.parsed_offset(), -1);
        obj.set_parsed_offset(10);
        obj.set_parsed_offset(99); // only the first recording sticks
        assert_eq!(obj.parsed_offset(), 10);

        assert!(obj.description().is_none());
        obj.set_description("trailer /Root");
        assert_eq!(obj.description(), Some("trailer /Root".to_string()));

        let doc = Document::new();
        let ind = doc.make_indirect(&Object::integer(2)).unwrap();
        assert_eq!(ind.description(), Some("object 1 0".to_string()));
    }
}

mod ownership_tests {
    use super::*;

    #[test]
    fn test_cross_document_insertion_fails_fast() {
        let doc_a = Document::new();
        let doc_b = Document::new();
        let array = doc_a.make_indirect(&Object::array(vec![])).unwrap();
        let foreign = doc_b.make_indirect(&Object::integer(1)).unwrap();

        assert!(matches!(array.append_item(&foreign), Err(Error::ForeignObject)));
        let dict = doc_a.make_indirect(&Object::dictionary(vec![])).unwrap();
        assert!(matches!(
            dict.replace_key("K", &foreign),
            Err(Error::ForeignObject)
        ));
    }

    #[test]
    fn test_same_document_and_unowned_edges_are_fine() {
        let doc = Document::new();
        let array = doc.make_indirect(&Object::array(vec![])).unwrap();
        let local = doc.make_indirect(&Object::integer(1)).unwrap();
        array.append_item(&local).unwrap();
        array.append_item(&Object::integer(2)).unwrap();
        assert_eq!(array.size(), 2);
    }

    #[test]
    fn test_copying_adopts_foreign_values() {
        let doc_a = Document::new();
        let doc_b = Document::new();
        let array = doc_a.make_indirect(&Object::array(vec![])).unwrap();
        let foreign = doc_b.make_indirect(&Object::integer(7)).unwrap();

        // an explicit copy severs the foreign ownership
        array.append_item(&foreign.copy(false).unwrap()).unwrap();
        assert_eq!(array.unparse().unwrap(), "[ 7 ]");
    }
}

mod stream_tests {
    use super::*;
    use std::rc::Rc;

    struct Doubler(Bytes);

    impl pdf_objects::StreamDataProvider for Doubler {
        fn provide(&self) -> Bytes {
            let mut out = self.0.to_vec();
            out.extend_from_slice(&self.0);
            Bytes::from(out)
        }
    }

    #[test]
    fn test_stream_data_and_provider() {
        let stream = Object::stream(Object::dictionary(vec![]), Bytes::from_static(b"abc")).unwrap();
        assert_eq!(stream.stream_data().unwrap(), Some(Bytes::from_static(b"abc")));

        stream
            .replace_stream_provider(Rc::new(Doubler(Bytes::from_static(b"xy"))))
            .unwrap();
        assert_eq!(stream.stream_data().unwrap(), Some(Bytes::from_static(b"xyxy")));
    }

    #[test]
    fn test_stream_dict_is_reachable_and_mutable() {
        let stream = Object::stream(
            Object::dictionary(vec![("Type", Object::name("XObject"))]),
            Bytes::from_static(b"d"),
        )
        .unwrap();
        let dict = stream.stream_dict().unwrap();
        dict.replace_key("Subtype", &Object::name("Image")).unwrap();
        assert_eq!(
            stream.stream_dict().unwrap().get_key("Subtype").unwrap().as_name(),
            Some("Image".to_string())
        );
    }

    #[test]
    fn test_indirect_stream_unparses_as_reference() {
        let doc = Document::new();
        let stream = Object::stream(Object::dictionary(vec![]), Bytes::from_static(b"s")).unwrap();
        let adopted = doc.make_indirect(&stream).unwrap();
        assert_eq!(adopted.unparse().unwrap(), "1 0 R");
    }
}
