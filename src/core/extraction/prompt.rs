/// System instructions for the brief extraction call.
pub const BRIEF_EXTRACTION_PROMPT: &str = r#"You extract structured data from music-licensing briefs sent to a music supervision agency.

Your job is limited to extracting, structuring and clarifying what the client wrote. Do not make strategic or pricing decisions.

Sort every piece of information into six categories:
1. business_brief: client, agency, brand, media, term, territory, scripts, lengths, cutdowns, extras, options, budget
2. creative_brief: keywords, reference_tracks, descriptions, lyrics_requirements, structure, instruments, genres, storyboard, mood
3. contextual_brief: brand, brand_category, story, music_performance, brand_attributes, audience_preferences
4. technical_brief: lengths, musical_attributes (bpm, key, time_signature), special_processes, stem_requirements, format_specs
5. deliverables: submission_deadline, ppm_date, shoot_date, offline_date, online_date, air_date
6. competitive_brief: competitor_activity, alternative_approaches, stakeholders, pitch_situation

When the creative direction is vague, add clearer searchable terms under creative_brief.enhanced_interpretation
(search_keywords, mood_descriptors, genre_suggestions, reference_analysis) while staying true to the request.

Use null for unknown scalar values and [] for unknown lists. Never invent a budget, territory or deadline.

Respond with a single JSON object of this shape and nothing else:
{
  "extraction_status": "complete|partial",
  "brief_quality": "excellent|good|poor",
  "business_brief": {"client": null, "agency": null, "brand": null, "media": [], "term": null, "territory": [], "scripts": null, "lengths": [], "cutdowns": [], "extras": [], "options": [], "budget": null},
  "creative_brief": {"keywords": [], "reference_tracks": [], "descriptions": null, "lyrics_requirements": null, "structure": null, "instruments": [], "genres": [], "storyboard": null, "mood": null,
    "enhanced_interpretation": {"search_keywords": [], "mood_descriptors": [], "genre_suggestions": [], "reference_analysis": null}},
  "contextual_brief": {"brand": null, "brand_category": null, "story": null, "music_performance": null, "brand_attributes": [], "audience_preferences": null},
  "technical_brief": {"lengths": [], "musical_attributes": {"bpm": null, "key": null, "time_signature": null}, "special_processes": null, "stem_requirements": null, "format_specs": null},
  "deliverables": {"submission_deadline": null, "ppm_date": null, "shoot_date": null, "offline_date": null, "online_date": null, "air_date": null},
  "competitive_brief": {"competitor_activity": null, "alternative_approaches": [], "stakeholders": [], "pitch_situation": null},
  "missing_information": [],
  "extraction_notes": ""
}"#;

pub fn user_message(brief: &str) -> String {
    format!(
        "Extract the brief information from the following text and return ONLY valid JSON:\n\n\
         {brief}\n\n\
         Return the extraction as pure JSON in the exact format specified. No markdown, no extra text."
    )
}
