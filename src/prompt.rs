/*
This module builds the few-shot tagging prompt: a fixed instruction, the tag
vocabulary, the exemplar sentences with their gold tag sequences, and a cue
for the sentence to be tagged next. Everything here is a pure function of
its inputs.
*/

/// The marker the model is instructed to emit after a finished tag sequence.
/// The aligner stops extracting at its first occurrence.
pub const STOP_MARKER: &str = "#####";

/// Fine-grained entity types by coarse group, as presented to the model in
/// the tag vocabulary.
pub const ENTITY_CATALOG: &[(&str, &[&str])] = &[
    (
        "Location (LOC)",
        &["Facility", "OtherLOC", "HumanSettlement", "Station"],
    ),
    (
        "Creative Work (CW)",
        &["VisualWork", "MusicalWork", "WrittenWork", "ArtWork", "Software"],
    ),
    (
        "Group (GRP)",
        &[
            "MusicalGRP",
            "PublicCORP",
            "PrivateCORP",
            "AerospaceManufacturer",
            "SportsGRP",
            "CarManufacturer",
            "ORG",
        ],
    ),
    (
        "Person (PER)",
        &[
            "Scientist",
            "Artist",
            "Athlete",
            "Politician",
            "Cleric",
            "SportsManager",
            "OtherPER",
        ],
    ),
    (
        "Product (PROD)",
        &["Clothing", "Vehicle", "Food", "Drink", "OtherPROD"],
    ),
    (
        "Medical (MED)",
        &[
            "Medication/Vaccine",
            "MedicalProcedure",
            "AnatomicalStructure",
            "Symptom",
            "Disease",
        ],
    ),
];

/// Renders the tag vocabulary: one line per entity group listing its `B-` and
/// `I-` tags, then the `O` line.
pub fn tag_vocabulary() -> String {
    let mut vocabulary = String::new();
    for (group, types) in ENTITY_CATALOG {
        let tags: Vec<String> = types
            .iter()
            .map(|entity_type| format!("B-{entity_type}, I-{entity_type}"))
            .collect();
        vocabulary.push_str(&format!("{group}: {}\n", tags.join(", ")));
    }
    vocabulary.push_str("O (Outside of any entity)\n");
    vocabulary
}

/// Builds the instruction block shared by every query of a language: the task
/// description, the tag vocabulary and the few-shot exemplars, ending with
/// the lead-in for the sentence to be tagged next. Each exemplar is a
/// `(sentence, tag line)` pair of space-joined strings.
pub fn instruction_prompt(language: &str, exemplars: &[(String, String)]) -> String {
    let vocabulary = tag_vocabulary();
    let mut prompt = format!(
        "For the following sequences of words in the {language} sentences, generate the \
         appropriate sequence of BIO tags, each tag corresponding with each word in a sentence. \
         Indicate the end of the generated sequence with a {STOP_MARKER} symbol. {STOP_MARKER} \
         means that the sequence of BIO Tags for the corresponding sentence has ended. Each \
         entity type is marked as 'B-' (beginning), 'I-' (inside), or 'O' (outside). Types \
         include Location (LOC), Creative Work (CW), Group (GRP), Person (PER), Product (PROD), \
         and Medical (MED). Here are all possible BIO Tags:\n{vocabulary}\n Here are some \
         examples:\n"
    );
    for (sentence, tag_line) in exemplars {
        prompt.push_str(&format!(
            "Sentence: {sentence}\n   Sequence of BIO Tags: {tag_line} {STOP_MARKER}\n"
        ));
    }
    prompt.push_str(&format!(
        "\nNow, using the same format as the examples, generate a sequence of BIO tags for the \
         following sentence with each tag corresponding with each word in the new {language} \
         sentence:\n"
    ));
    prompt
}

/// The cue appended to the instruction block for one query. The aligner
/// searches the decoded text for this exact string to locate the answer.
pub fn sentence_cue(sentence: &str) -> String {
    format!("\nSentence: {sentence}\nSequence of BIO Tags:")
}
